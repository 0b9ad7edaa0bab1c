//! Keyword filter over the crawled forest
//!
//! For every keyword the forest is walked in crawl order and three row sets
//! are produced: university contacts, hospital contacts and hospital links.
//! A hospital takes part when the keyword is one of its specialties (exact,
//! case-sensitive). University contacts are emitted once per university and
//! keyword, driven by the first matching hospital; hospital rows are emitted
//! for every match.

use crate::records::{Hospital, University};
use std::collections::HashSet;

/// A university-level contact under a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityEmailRow {
    pub university: String,
    pub keyword: String,
    pub name: String,
    pub position: String,
    pub email: String,
}

/// A hospital-level contact under a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalEmailRow {
    pub university: String,
    pub hospital: String,
    pub keyword: String,
    pub name: String,
    pub position: String,
    pub email: String,
}

/// A matching hospital's homepage under a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalLinkRow {
    pub hospital: String,
    pub homepage: String,
    pub keyword: String,
}

/// The three row sets produced for one keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTables {
    pub keyword: String,
    pub university_rows: Vec<UniversityEmailRow>,
    pub hospital_rows: Vec<HospitalEmailRow>,
    pub link_rows: Vec<HospitalLinkRow>,
}

impl KeywordTables {
    fn empty(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            university_rows: Vec::new(),
            hospital_rows: Vec::new(),
            link_rows: Vec::new(),
        }
    }

    /// Number of hospitals that matched this keyword
    pub fn matched_hospitals(&self) -> usize {
        self.link_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.university_rows.is_empty() && self.hospital_rows.is_empty() && self.link_rows.is_empty()
    }
}

/// Builds the tables for every keyword, in keyword order
///
/// Pure function of its inputs: calling it twice on the same forest and
/// keywords yields identical tables.
pub fn aggregate(universities: &[University], keywords: &[String]) -> Vec<KeywordTables> {
    keywords
        .iter()
        .map(|keyword| filter_keyword(universities, keyword))
        .collect()
}

/// Builds the tables for a single keyword
pub fn filter_keyword(universities: &[University], keyword: &str) -> KeywordTables {
    let mut tables = KeywordTables::empty(keyword);
    // Dedup state lives only for this keyword
    let mut seen_universities: HashSet<&str> = HashSet::new();

    for university in universities {
        for hospital in university.hospitals().iter().filter(|h| h.offers(keyword)) {
            if seen_universities.insert(university.name()) {
                push_university_rows(&mut tables, university, keyword);
            }
            push_hospital_rows(&mut tables, university, hospital, keyword);
        }
    }

    tracing::debug!(
        "Keyword {}: {} hospitals, {} university rows, {} hospital rows",
        keyword,
        tables.matched_hospitals(),
        tables.university_rows.len(),
        tables.hospital_rows.len()
    );

    tables
}

fn push_university_rows(tables: &mut KeywordTables, university: &University, keyword: &str) {
    tables
        .university_rows
        .extend(university.contacts().iter().map(|person| UniversityEmailRow {
            university: university.name().to_string(),
            keyword: keyword.to_string(),
            name: person.name().to_string(),
            position: person.position().to_string(),
            email: person.email().to_string(),
        }));
}

fn push_hospital_rows(
    tables: &mut KeywordTables,
    university: &University,
    hospital: &Hospital,
    keyword: &str,
) {
    tables
        .hospital_rows
        .extend(hospital.contacts().iter().map(|person| HospitalEmailRow {
            university: university.name().to_string(),
            hospital: hospital.name().to_string(),
            keyword: keyword.to_string(),
            name: person.name().to_string(),
            position: person.position().to_string(),
            email: person.email().to_string(),
        }));

    tables.link_rows.push(HospitalLinkRow {
        hospital: hospital.name().to_string(),
        homepage: hospital.homepage_url().to_string(),
        keyword: keyword.to_string(),
    });
}
