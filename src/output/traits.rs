//! Export sink trait and row type
//!
//! This module defines the interface the exporter writes tables through,
//! and the flat row type those tables are made of.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write table {name}: {message}")]
    Write { name: String, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One flat table row: ordered `(column, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRow {
    fields: Vec<(String, String)>,
}

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, replacing an existing value in place
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(field) => field.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Union of the columns of `rows`, in first-seen order
pub fn header_for(rows: &[ExportRow]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for column in rows.iter().flat_map(ExportRow::columns) {
        if !header.iter().any(|h| h == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// Trait for tabular export sinks
///
/// A sink receives whole tables identified by a logical name such as
/// `Kardiologie_Uni_emails`. Rows may have different columns; cells missing
/// from a row render as empty.
///
/// Writing is two-phase so that a group of tables can be published as a
/// unit: every table is staged first, then the whole group is committed or
/// abandoned.
pub trait ExportSink {
    /// A table that has been written but not yet published
    type Staged;

    /// Prepares a complete table without making it visible
    ///
    /// # Arguments
    ///
    /// * `rows` - The table rows, possibly empty
    /// * `logical_name` - Table name, without extension or directory
    fn stage(&self, rows: &[ExportRow], logical_name: &str) -> OutputResult<Self::Staged>;

    /// Publishes every staged table, or none of them
    ///
    /// On error, tables published by an earlier run under the same names
    /// must be left as they were.
    fn commit(&self, staged: Vec<Self::Staged>) -> OutputResult<()>;

    /// Drops staged tables without publishing them
    fn abandon(&self, staged: Vec<Self::Staged>);

    /// Stages and commits a single table
    fn write(&self, rows: &[ExportRow], logical_name: &str) -> OutputResult<()> {
        let staged = self.stage(rows, logical_name)?;
        self.commit(vec![staged])
    }
}
