use crate::config::types::{Config, HttpConfig, OutputConfig, SearchConfig, SiteConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Env file read when no other is given
pub const DEFAULT_ENV_FILE: &str = "pj.env";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pj_portal_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Keywords: {:?}", config.search.keywords);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Loads the configuration from environment variables
///
/// The env file is loaded first. An explicitly given file must exist; the
/// default `pj.env` is optional. Variables already set in the process
/// environment take precedence over the file.
///
/// | Variable | Meaning |
/// |----------|---------|
/// | `URL` | home page to crawl (required) |
/// | `KEYWORDS` | comma-separated specialties (required) |
/// | `BASE_URL` | link prefix (optional) |
/// | `OUTPUT_DIR` | export directory (optional) |
pub fn load_config_from_env(env_file: Option<&Path>) -> Result<Config, ConfigError> {
    match env_file {
        Some(path) => {
            dotenv::from_path(path).map_err(|e| {
                ConfigError::Env(format!("Failed to load {}: {}", path.display(), e))
            })?;
        }
        None => {
            if dotenv::from_path(DEFAULT_ENV_FILE).is_ok() {
                tracing::debug!("Loaded environment from {}", DEFAULT_ENV_FILE);
            }
        }
    }

    config_from_vars(|name| std::env::var(name).ok())
}

/// Builds a configuration from a variable lookup
///
/// `lookup` returns the value of a variable, or `None` when unset.
pub fn config_from_vars<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("URL").ok_or_else(|| ConfigError::Env("URL is not set".to_string()))?;
    let keywords = lookup("KEYWORDS")
        .map(|raw| split_keywords(&raw))
        .ok_or_else(|| ConfigError::Env("KEYWORDS is not set".to_string()))?;

    let mut output = OutputConfig::default();
    if let Some(dir) = lookup("OUTPUT_DIR") {
        output.directory = PathBuf::from(dir);
    }

    let config = Config {
        site: SiteConfig {
            url,
            base_url: lookup("BASE_URL"),
        },
        search: SearchConfig { keywords },
        http: HttpConfig::default(),
        output,
    };

    validate(&config)?;

    Ok(config)
}

/// Splits a comma-separated keyword list, trimming entries and dropping empty ones
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
