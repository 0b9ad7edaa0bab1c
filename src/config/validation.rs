use crate::config::types::{Config, HttpConfig, OutputConfig, SearchConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

const FORBIDDEN_KEYWORD_CHARS: &[char] = &['/', '\\', '\0'];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_search_config(&config.search)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the home page and base URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("url", &config.url)?;

    if let Some(base) = &config.base_url {
        validate_http_url("base-url", base)?;
    }

    Ok(())
}

/// Validates the keyword list
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "at least one keyword is required".to_string(),
        ));
    }

    if let Some(blank) = config.keywords.iter().find(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "keywords cannot be blank, got '{}'",
            blank
        )));
    }

    // Keywords become part of export file names
    if let Some(bad) = config
        .keywords
        .iter()
        .find(|k| k.contains(FORBIDDEN_KEYWORD_CHARS))
    {
        return Err(ConfigError::Validation(format!(
            "keywords cannot contain path separators or NUL, got '{}'",
            bad.escape_default()
        )));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
