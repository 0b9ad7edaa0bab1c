//! Configuration module for the crawler
//!
//! The configuration comes either from a TOML file or from environment
//! variables (optionally seeded from a `pj.env` file). Both paths end in the
//! same validated [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use pj_portal_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawling {}", config.site.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FailurePolicy, HttpConfig, OutputConfig, SearchConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    config_from_vars, load_config, load_config_from_env, split_keywords, DEFAULT_ENV_FILE,
};
