//! Crawled record types
//!
//! The forest built by the crawler is made of these three value types. They
//! are assembled bottom-up (contacts, then hospitals, then universities) and
//! expose no mutators once built.

/// Placeholder stored when a hospital page has no usable homepage link
pub const NOT_FOUND: &str = "Not Found";

/// One staff entry scraped from a position block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    position: String,
    name: String,
    email: String,
}

impl Contact {
    pub fn new(
        position: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            position: position.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A teaching hospital and everything scraped from its page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hospital {
    name: String,
    source_url: String,
    homepage_url: String,
    contacts: Vec<Contact>,
    specialties: Vec<String>,
}

impl Hospital {
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        homepage_url: impl Into<String>,
        contacts: Vec<Contact>,
        specialties: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            homepage_url: homepage_url.into(),
            contacts,
            specialties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory page this record was scraped from
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The hospital's own website, or [`NOT_FOUND`]
    pub fn homepage_url(&self) -> &str {
        &self.homepage_url
    }

    pub fn has_homepage(&self) -> bool {
        self.homepage_url != NOT_FOUND
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Department labels in document order, duplicates included
    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    /// Exact, case-sensitive membership test used by the keyword filter
    pub fn offers(&self, specialty: &str) -> bool {
        self.specialties.iter().any(|s| s == specialty)
    }
}

/// A university (medical faculty) and its hospitals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct University {
    name: String,
    source_url: String,
    contacts: Vec<Contact>,
    hospitals: Vec<Hospital>,
}

impl University {
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        contacts: Vec<Contact>,
        hospitals: Vec<Hospital>,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            contacts,
            hospitals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn hospitals(&self) -> &[Hospital] {
        &self.hospitals
    }
}
