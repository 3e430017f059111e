//! Reviewable reports of lookup failures.
//!
//! Each lookup transformer with unmatched keys produces one report: a CSV
//! with one column per key field plus an `occurrences` column, one row per
//! distinct key in first-seen order.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::unmatched::UnmatchedEntry;

/// Trailing column holding how often each key was seen.
pub const OCCURRENCES_COLUMN: &str = "occurrences";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub transformer: String,
    pub key_columns: Vec<String>,
    pub entries: Vec<UnmatchedEntry>,
}

impl FailureReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File name for this report: `<transformer>.unmatched.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.unmatched.csv", self.transformer)
    }

    pub fn write_csv<W: Write>(&self, output: W) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(
            self.key_columns
                .iter()
                .map(String::as_str)
                .chain([OCCURRENCES_COLUMN]),
        )?;
        for entry in &self.entries {
            let mut row: Vec<String> = self
                .key_columns
                .iter()
                .map(|column| entry.key.get(column).unwrap_or_default().to_string())
                .collect();
            row.push(entry.occurrences.to_string());
            writer.write_record(&row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Render the report as CSV text.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut out = Vec::new();
        self.write_csv(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the report into `dir`, returning the file path.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(self.file_name());
        let file = File::create(&path).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        self.write_csv(file)?;
        Ok(path)
    }
}
