//! Output module for exporting keyword tables
//!
//! This module handles:
//! - The [`ExportSink`] interface and its CSV implementation
//! - Converting aggregated rows into flat export rows
//! - Writing the three tables of each keyword as one unit

mod csv_sink;
mod traits;

pub use csv_sink::{CsvSink, StagedTable};
pub use traits::{header_for, ExportRow, ExportSink, OutputError, OutputResult};

use crate::aggregate::{HospitalEmailRow, HospitalLinkRow, KeywordTables, UniversityEmailRow};

/// Table name suffix for university contacts
pub const UNIVERSITY_EMAILS: &str = "Uni_emails";
/// Table name suffix for hospital contacts
pub const HOSPITAL_EMAILS: &str = "Hos_emails";
/// Table name suffix for hospital homepages
pub const HOSPITAL_LINKS: &str = "Hos_links";

/// Logical table name for `keyword` and one of the suffixes above
pub fn table_name(keyword: &str, suffix: &str) -> String {
    format!("{}_{}", keyword, suffix)
}

impl From<&UniversityEmailRow> for ExportRow {
    fn from(row: &UniversityEmailRow) -> Self {
        ExportRow::new()
            .with("University", row.university.as_str())
            .with("Keyword", row.keyword.as_str())
            .with("Name", row.name.as_str())
            .with("Position", row.position.as_str())
            .with("Email", row.email.as_str())
    }
}

impl From<&HospitalEmailRow> for ExportRow {
    fn from(row: &HospitalEmailRow) -> Self {
        ExportRow::new()
            .with("University", row.university.as_str())
            .with("Hospital", row.hospital.as_str())
            .with("Keyword", row.keyword.as_str())
            .with("Name", row.name.as_str())
            .with("Position", row.position.as_str())
            .with("Email", row.email.as_str())
    }
}

impl From<&HospitalLinkRow> for ExportRow {
    fn from(row: &HospitalLinkRow) -> Self {
        ExportRow::new()
            .with("Hospital", row.hospital.as_str())
            .with("Homepage", row.homepage.as_str())
            .with("Keyword", row.keyword.as_str())
    }
}

fn to_export_rows<'a, T>(rows: &'a [T]) -> Vec<ExportRow>
where
    ExportRow: From<&'a T>,
{
    rows.iter().map(ExportRow::from).collect()
}

/// Writes the three tables of one keyword
///
/// All three tables (university contacts, hospital contacts, hospital
/// links) are staged before any is published. If staging fails, the staged
/// tables are abandoned; if publishing fails, the sink keeps the previous
/// run's tables. Either way the keyword is exported all-or-nothing.
///
/// # Returns
///
/// * `Ok(())` - All three tables published
/// * `Err(OutputError)` - Nothing was published for this keyword
pub fn export_keyword<S: ExportSink>(sink: &S, tables: &KeywordTables) -> OutputResult<()> {
    let keyword = tables.keyword.as_str();
    let planned = [
        (
            table_name(keyword, UNIVERSITY_EMAILS),
            to_export_rows(&tables.university_rows),
        ),
        (
            table_name(keyword, HOSPITAL_EMAILS),
            to_export_rows(&tables.hospital_rows),
        ),
        (
            table_name(keyword, HOSPITAL_LINKS),
            to_export_rows(&tables.link_rows),
        ),
    ];

    let mut staged = Vec::with_capacity(planned.len());
    for (name, rows) in &planned {
        match sink.stage(rows, name) {
            Ok(table) => staged.push(table),
            Err(e) => {
                sink.abandon(staged);
                return Err(e);
            }
        }
    }

    sink.commit(staged)
}

/// Outcome of exporting every keyword
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Keywords whose three tables were all written
    pub exported: Vec<String>,

    /// Keywords that failed, with the error
    pub failed: Vec<(String, OutputError)>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Exports every keyword; a failing keyword does not stop the others
pub fn export_all<S: ExportSink>(sink: &S, all_tables: &[KeywordTables]) -> ExportReport {
    let mut report = ExportReport::default();

    for tables in all_tables {
        match export_keyword(sink, tables) {
            Ok(()) => report.exported.push(tables.keyword.clone()),
            Err(e) => {
                tracing::error!("Export of keyword {} failed: {}", tables.keyword, e);
                report.failed.push((tables.keyword.clone(), e));
            }
        }
    }

    report
}
