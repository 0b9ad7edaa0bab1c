//! Crawler module for directory traversal
//!
//! This module contains the crawling side of the pipeline:
//! - Page fetching behind the [`PageFetcher`] trait
//! - Record extraction from the three page kinds
//! - Sequential traversal into the university forest

mod coordinator;
mod extractor;
mod fetcher;

pub use coordinator::{CrawlOutcome, Crawler, PageFailure, PageKind};
pub use extractor::{deobfuscate_email, join_site_link, Extractor, HospitalSummary};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};

use crate::config::Config;

/// Runs a complete crawl from the configured home page
///
/// Builds the HTTP fetcher and extractor from `config`, then walks the
/// directory with the configured failure policy.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: &Config) -> crate::Result<CrawlOutcome> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let extractor = Extractor::new(config.site.resolved_base_url())?;

    Crawler::new(fetcher, extractor)
        .with_policy(config.output.on_error)
        .crawl(&config.site.url)
        .await
}
