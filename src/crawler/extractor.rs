//! Record extraction from directory pages
//!
//! This module turns the HTML of the three page kinds on the directory site
//! into records:
//! - the home page yields university links
//! - a university page yields its name, staff contacts and hospital links
//! - a hospital page yields its name, homepage, staff contacts and specialties
//!
//! Lookups come in two flavours. Required elements (page titles, the hospital
//! list container) fail the page with [`ExtractError::RequiredElementMissing`].
//! Optional elements (staff block parts, the websites section) fall back to an
//! empty or sentinel value.

use crate::records::{Contact, NOT_FOUND};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Obfuscation token the site uses in place of `@`
const AT_TOKEN: &str = " (at) ";

const STAFF_BLOCK: &str = "div.Position.Stufe_0";
const ROLE_LABEL: &str = "h3";
const PERSON_NAME: &str = "p.Person.Stufe_0";
const ANCHOR: &str = "a";
const LINK: &str = "a[href]";
const PARAGRAPH: &str = "p";
const HOSPITAL_TITLE: &str = "#content_Krankenhaus_bezeichnung";
const HOSPITAL_WEBSITES: &str = "#content_Krankenhaus_Webseiten";
const SPECIALTY: &str = "span.Fach";
const UNIVERSITY_TITLE: &str = "#content_Fakultaet_bezeichnung";
const UNIVERSITY_HOSPITALS: &str = "#Fakultaet_Krankenhaeuser";
const UNIVERSITY_WRAPPER: &str = "div.fakultaet_wrapper";

/// Name, homepage and specialties of a hospital page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalSummary {
    pub name: String,
    /// Hospital website, or [`NOT_FOUND`]
    pub homepage_url: String,
    pub specialties: Vec<String>,
}

/// Compiled selectors plus the base URL used to resolve site links
#[derive(Debug)]
pub struct Extractor {
    base_url: String,
    staff_block: Selector,
    role_label: Selector,
    person_name: Selector,
    anchor: Selector,
    link: Selector,
    paragraph: Selector,
    hospital_title: Selector,
    hospital_websites: Selector,
    specialty: Selector,
    university_title: Selector,
    university_hospitals: Selector,
    university_wrapper: Selector,
}

impl Extractor {
    /// Builds an extractor resolving links against `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Site root that root-relative hrefs are appended to
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All selectors compiled
    /// * `Err(ExtractError)` - A selector failed to compile
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExtractError> {
        Ok(Self {
            base_url: base_url.into(),
            staff_block: compile(STAFF_BLOCK)?,
            role_label: compile(ROLE_LABEL)?,
            person_name: compile(PERSON_NAME)?,
            anchor: compile(ANCHOR)?,
            link: compile(LINK)?,
            paragraph: compile(PARAGRAPH)?,
            hospital_title: compile(HOSPITAL_TITLE)?,
            hospital_websites: compile(HOSPITAL_WEBSITES)?,
            specialty: compile(SPECIALTY)?,
            university_title: compile(UNIVERSITY_TITLE)?,
            university_hospitals: compile(UNIVERSITY_HOSPITALS)?,
            university_wrapper: compile(UNIVERSITY_WRAPPER)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Extracts every complete staff block on the page
    ///
    /// A block needs a role label, a person name and an email anchor. Blocks
    /// missing any of the three are skipped. Document order is preserved.
    pub fn extract_contacts(&self, document: &Html) -> Vec<Contact> {
        document
            .select(&self.staff_block)
            .filter_map(|block| {
                let position = block.select(&self.role_label).next()?;
                let name = block.select(&self.person_name).next()?;
                let email = block.select(&self.anchor).next()?;

                Some(Contact::new(
                    element_text(position),
                    element_text(name),
                    deobfuscate_email(&element_text(email)),
                ))
            })
            .collect()
    }

    /// Extracts the hospital name, homepage link and specialty labels
    ///
    /// # Returns
    ///
    /// * `Ok(HospitalSummary)` - Name found; homepage may be [`NOT_FOUND`]
    /// * `Err(ExtractError)` - The page has no hospital title
    pub fn extract_hospital_summary(&self, document: &Html) -> Result<HospitalSummary, ExtractError> {
        let name = self.required_text(document, &self.hospital_title, HOSPITAL_TITLE)?;

        let homepage_url = self
            .homepage_link(document)
            .unwrap_or_else(|| NOT_FOUND.to_string());

        let specialties = document
            .select(&self.specialty)
            .map(element_text)
            .collect();

        Ok(HospitalSummary {
            name,
            homepage_url,
            specialties,
        })
    }

    /// Extracts the university (faculty) name
    pub fn extract_university_name(&self, document: &Html) -> Result<String, ExtractError> {
        self.required_text(document, &self.university_title, UNIVERSITY_TITLE)
    }

    /// Extracts absolute links to every hospital listed on a university page
    ///
    /// The hospital list container is required. Anchors inside it without an
    /// `href` are ignored.
    pub fn extract_university_hospital_links(
        &self,
        document: &Html,
    ) -> Result<Vec<String>, ExtractError> {
        let container = document
            .select(&self.university_hospitals)
            .next()
            .ok_or(ExtractError::RequiredElementMissing {
                element: UNIVERSITY_HOSPITALS,
            })?;

        Ok(container
            .select(&self.link)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| join_site_link(&self.base_url, href))
            .collect())
    }

    /// Extracts one absolute link per university wrapper on the home page
    ///
    /// The link is the `href` of the wrapper's first anchor. A wrapper with
    /// no anchor, or whose first anchor has no `href`, fails the page.
    pub fn extract_home_university_links(
        &self,
        document: &Html,
    ) -> Result<Vec<String>, ExtractError> {
        document
            .select(&self.university_wrapper)
            .map(|wrapper| {
                wrapper
                    .select(&self.anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|href| join_site_link(&self.base_url, href))
                    .ok_or(ExtractError::RequiredElementMissing {
                        element: "div.fakultaet_wrapper a[href]",
                    })
            })
            .collect()
    }

    /// Websites section → first paragraph → first anchor → href
    fn homepage_link(&self, document: &Html) -> Option<String> {
        let section = document.select(&self.hospital_websites).next()?;
        let paragraph = section.select(&self.paragraph).next()?;
        let anchor = paragraph.select(&self.anchor).next()?;
        anchor.value().attr("href").map(str::to_string)
    }

    fn required_text(
        &self,
        document: &Html,
        selector: &Selector,
        element: &'static str,
    ) -> Result<String, ExtractError> {
        document
            .select(selector)
            .next()
            .map(element_text)
            .ok_or(ExtractError::RequiredElementMissing { element })
    }
}

/// Replaces the site's `" (at) "` token with `@`
///
/// This is a literal substitution; the result is not validated.
pub fn deobfuscate_email(raw: &str) -> String {
    raw.replace(AT_TOKEN, "@")
}

/// Joins a site href onto the base URL with exactly one `/` between them
///
/// Trailing slashes of `base_url` and leading slashes of `href` are
/// collapsed into that one separator. Nothing else is touched: the href is
/// not trimmed, and dot segments, queries or absolute URLs pass through
/// verbatim. The site delivers root-relative hrefs.
pub fn join_site_link(base_url: &str, href: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

fn compile(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css,
        message: format!("{:?}", e),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
