//! CSV export sink
//!
//! Each table becomes `<directory>/<logical_name>_output.csv`. Staging writes
//! a hidden temporary file next to the final one; committing renames a whole
//! group of temporaries into place. Tables published by an earlier run are
//! moved aside during the commit and restored if any rename fails.

use crate::output::traits::{header_for, ExportRow, ExportSink, OutputError, OutputResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes tables as CSV files into a directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
}

/// A table written to its temporary file, not yet renamed into place
#[derive(Debug)]
pub struct StagedTable {
    name: String,
    temp_path: PathBuf,
    final_path: PathBuf,
    backup_path: PathBuf,
}

impl StagedTable {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Final path of the table called `logical_name`
    pub fn path_for(&self, logical_name: &str) -> PathBuf {
        self.directory.join(format!("{}_output.csv", logical_name))
    }

    fn temp_path_for(&self, logical_name: &str) -> PathBuf {
        self.directory
            .join(format!(".{}_output.csv.tmp", logical_name))
    }

    fn backup_path_for(&self, logical_name: &str) -> PathBuf {
        self.directory
            .join(format!(".{}_output.csv.bak", logical_name))
    }
}

impl ExportSink for CsvSink {
    type Staged = StagedTable;

    fn stage(&self, rows: &[ExportRow], logical_name: &str) -> OutputResult<StagedTable> {
        fs::create_dir_all(&self.directory)?;

        let temp_path = self.temp_path_for(logical_name);
        if let Err(e) = write_table(&temp_path, rows) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        Ok(StagedTable {
            name: logical_name.to_string(),
            temp_path,
            final_path: self.path_for(logical_name),
            backup_path: self.backup_path_for(logical_name),
        })
    }

    fn commit(&self, staged: Vec<StagedTable>) -> OutputResult<()> {
        // Anything but a regular file at a final path cannot be replaced
        let blocked = staged.iter().find(|table| {
            fs::symlink_metadata(&table.final_path)
                .map(|meta| !meta.file_type().is_file())
                .unwrap_or(false)
        });
        if let Some(table) = blocked {
            let err = OutputError::Write {
                name: table.name.clone(),
                message: format!(
                    "{} exists and is not a regular file",
                    table.final_path.display()
                ),
            };
            remove_temps(&staged);
            return Err(err);
        }

        let mut backed_up: Vec<&StagedTable> = Vec::new();
        for table in &staged {
            if !table.final_path.exists() {
                continue;
            }
            if let Err(e) = fs::rename(&table.final_path, &table.backup_path) {
                restore_backups(&backed_up);
                remove_temps(&staged);
                return Err(e.into());
            }
            backed_up.push(table);
        }

        for (placed, table) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(&table.temp_path, &table.final_path) {
                for done in &staged[..placed] {
                    let _ = fs::remove_file(&done.final_path);
                }
                restore_backups(&backed_up);
                remove_temps(&staged[placed..]);
                return Err(e.into());
            }
        }

        for table in &backed_up {
            if let Err(e) = fs::remove_file(&table.backup_path) {
                tracing::warn!("Failed to remove {}: {}", table.backup_path.display(), e);
            }
        }
        for table in &staged {
            tracing::info!("Data has been saved to {}", table.final_path.display());
        }

        Ok(())
    }

    fn abandon(&self, staged: Vec<StagedTable>) {
        remove_temps(&staged);
    }
}

fn restore_backups(backed_up: &[&StagedTable]) {
    for table in backed_up {
        if let Err(e) = fs::rename(&table.backup_path, &table.final_path) {
            tracing::error!(
                "Failed to restore {} from {}: {}",
                table.final_path.display(),
                table.backup_path.display(),
                e
            );
        }
    }
}

fn remove_temps(staged: &[StagedTable]) {
    for table in staged {
        match fs::remove_file(&table.temp_path) {
            Ok(()) => tracing::debug!("Removed {}", table.temp_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", table.temp_path.display(), e),
        }
    }
}

/// Writes header and rows; an empty table produces an empty file
fn write_table(path: &Path, rows: &[ExportRow]) -> OutputResult<()> {
    let header = header_for(rows);
    let mut writer = csv::Writer::from_path(path)?;

    if !header.is_empty() {
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(header.iter().map(|column| row.get(column).unwrap_or("")))?;
        }
    }

    writer.flush()?;
    Ok(())
}
