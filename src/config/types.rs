use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the directory lives
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Home page the crawl starts from
    pub url: String,

    /// Prefix for site links; defaults to the origin of `url`
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,
}

impl SiteConfig {
    /// Returns the configured base URL, or `scheme://host[:port]/` of the home page
    pub fn resolved_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            return base.clone();
        }

        match Url::parse(&self.url) {
            Ok(url) => format!("{}/", url.origin().ascii_serialization()),
            Err(_) => self.url.clone(),
        }
    }
}

/// Keyword filter settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Specialty labels, matched exactly against hospital pages
    pub keywords: Vec<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Export and failure handling settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the export tables are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// What to do when a university or hospital page fails
    #[serde(rename = "on-error", default)]
    pub on_error: FailurePolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            on_error: FailurePolicy::default(),
        }
    }
}

/// Crawl behaviour when a page below the home page fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Any failure ends the crawl
    #[default]
    Abort,
    /// Drop the failing subtree, log it and continue
    Skip,
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
