//! Crawler coordinator - directory traversal
//!
//! This module walks the two-tier link hierarchy of the directory site:
//! - the home page lists universities
//! - each university page lists its teaching hospitals
//!
//! Pages are fetched one at a time, in link order, and assembled bottom-up
//! into the forest of [`University`] records.

use crate::config::FailurePolicy;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::PageFetcher;
use crate::records::{Hospital, University};
use crate::CrawlError;
use scraper::Html;
use std::fmt;

/// Which level of the hierarchy a page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    University,
    Hospital,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::University => write!(f, "university"),
            PageKind::Hospital => write!(f, "hospital"),
        }
    }
}

/// A subtree dropped under [`FailurePolicy::Skip`]
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub url: String,
    pub kind: PageKind,
    pub message: String,
}

/// Result of a finished crawl
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Universities in home page order
    pub universities: Vec<University>,

    /// Pages skipped because they failed (always empty under `Abort`)
    pub failures: Vec<PageFailure>,

    /// Number of successful page fetches, home page included
    pub pages_fetched: usize,
}

impl CrawlOutcome {
    pub fn hospital_count(&self) -> usize {
        self.universities.iter().map(|u| u.hospitals().len()).sum()
    }
}

/// What a university page yields before its hospitals are visited
struct UniversityPage {
    name: String,
    contacts: Vec<crate::records::Contact>,
    hospital_links: Vec<String>,
}

/// Sequential crawler over a [`PageFetcher`]
pub struct Crawler<F> {
    fetcher: F,
    extractor: Extractor,
    policy: FailurePolicy,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates a crawler with the default fail-fast policy
    pub fn new(fetcher: F, extractor: Extractor) -> Self {
        Self {
            fetcher,
            extractor,
            policy: FailurePolicy::Abort,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Crawls the whole directory starting at `home_url`
    ///
    /// # Flow
    ///
    /// 1. Fetch the home page and extract university links
    /// 2. For each university: fetch, extract name, contacts and hospital links
    /// 3. For each hospital of that university: fetch and extract the full record
    /// 4. Assemble everything preserving link order
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The forest, plus skipped pages under `Skip`
    /// * `Err(CrawlError)` - A fetch or required element failed. The home page
    ///   failing is fatal under every policy.
    pub async fn crawl(&self, home_url: &str) -> Result<CrawlOutcome, CrawlError> {
        let mut outcome = CrawlOutcome::default();

        let body = self.fetcher.fetch(home_url).await?;
        outcome.pages_fetched += 1;
        let university_links = {
            let document = Html::parse_document(&body);
            self.extractor
                .extract_home_university_links(&document)
                .map_err(|source| CrawlError::Extract {
                    url: home_url.to_string(),
                    source,
                })?
        };
        tracing::info!("Found {} universities on {}", university_links.len(), home_url);

        for link in &university_links {
            match self.crawl_university(link, &mut outcome).await {
                Ok(university) => {
                    tracing::info!(
                        "Crawled {} ({} hospitals, {} contacts)",
                        university.name(),
                        university.hospitals().len(),
                        university.contacts().len()
                    );
                    outcome.universities.push(university);
                }
                Err(e) => self.handle_failure(link, PageKind::University, e, &mut outcome)?,
            }
        }

        Ok(outcome)
    }

    async fn crawl_university(
        &self,
        url: &str,
        outcome: &mut CrawlOutcome,
    ) -> Result<University, CrawlError> {
        let body = self.fetcher.fetch(url).await?;
        outcome.pages_fetched += 1;
        let page = self.parse_university(url, &body)?;

        let mut hospitals = Vec::with_capacity(page.hospital_links.len());
        for link in &page.hospital_links {
            match self.crawl_hospital(link, outcome).await {
                Ok(hospital) => hospitals.push(hospital),
                Err(e) => self.handle_failure(link, PageKind::Hospital, e, outcome)?,
            }
        }

        Ok(University::new(page.name, url, page.contacts, hospitals))
    }

    async fn crawl_hospital(
        &self,
        url: &str,
        outcome: &mut CrawlOutcome,
    ) -> Result<Hospital, CrawlError> {
        let body = self.fetcher.fetch(url).await?;
        outcome.pages_fetched += 1;
        let document = Html::parse_document(&body);

        let summary = self
            .extractor
            .extract_hospital_summary(&document)
            .map_err(|source| CrawlError::Extract {
                url: url.to_string(),
                source,
            })?;
        let contacts = self.extractor.extract_contacts(&document);

        if summary.homepage_url == crate::records::NOT_FOUND {
            tracing::debug!("No homepage link on {}", url);
        }
        tracing::debug!(
            "Hospital {}: {} contacts, {} specialties",
            summary.name,
            contacts.len(),
            summary.specialties.len()
        );

        Ok(Hospital::new(
            summary.name,
            url,
            summary.homepage_url,
            contacts,
            summary.specialties,
        ))
    }

    fn parse_university(&self, url: &str, body: &str) -> Result<UniversityPage, CrawlError> {
        let document = Html::parse_document(body);
        let with_url = |source| CrawlError::Extract {
            url: url.to_string(),
            source,
        };

        let name = self
            .extractor
            .extract_university_name(&document)
            .map_err(with_url)?;
        let contacts = self.extractor.extract_contacts(&document);
        let hospital_links = self
            .extractor
            .extract_university_hospital_links(&document)
            .map_err(with_url)?;

        Ok(UniversityPage {
            name,
            contacts,
            hospital_links,
        })
    }

    /// Propagates `error` under `Abort`, records and swallows it under `Skip`
    fn handle_failure(
        &self,
        url: &str,
        kind: PageKind,
        error: CrawlError,
        outcome: &mut CrawlOutcome,
    ) -> Result<(), CrawlError> {
        match self.policy {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::Skip => {
                tracing::warn!("Skipping {} page {}: {}", kind, url, error);
                outcome.failures.push(PageFailure {
                    url: url.to_string(),
                    kind,
                    message: error.to_string(),
                });
                Ok(())
            }
        }
    }
}
