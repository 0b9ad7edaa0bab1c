//! pj-portal-crawler: contact harvester for the PJ directory
//!
//! This crate crawls a directory of universities and their teaching
//! hospitals, extracts staff contacts and department labels, and exports
//! keyword-filtered contact and homepage tables.

pub mod aggregate;
pub mod config;
pub mod crawler;
pub mod output;
pub mod records;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("Extractor setup failed: {0}")]
    Setup(#[from] ExtractError),
}

/// Page retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),
}

/// HTML extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required element missing: {element}")]
    RequiredElementMissing { element: &'static str },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        selector: &'static str,
        message: String,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use aggregate::{aggregate, KeywordTables};
pub use config::Config;
pub use crawler::{CrawlOutcome, Crawler, Extractor, HttpFetcher, PageFetcher};
pub use records::{Contact, Hospital, University, NOT_FOUND};
