//! Error types for dataset ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing datasets.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write an output file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Malformed CSV content.
    #[error("failed to parse CSV {source_name}: {source}")]
    CsvParse {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// Failed to serialize CSV output.
    #[error("failed to write CSV {target}: {source}")]
    CsvWrite {
        target: String,
        #[source]
        source: csv::Error,
    },

    /// CSV file has no header row.
    #[error("CSV has no header row: {source_name}")]
    MissingHeader { source_name: String },

    /// The same column name appears twice in the header.
    #[error("duplicate column '{column}' in {source_name}")]
    DuplicateColumn { column: String, source_name: String },

    /// A header cell is blank.
    #[error("blank column name at position {position} in {source_name}")]
    BlankColumn { position: usize, source_name: String },

    // === Metadata Errors ===
    /// Sidecar metadata is not valid JSON for the expected shape.
    #[error("invalid dataset metadata {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/nfhs.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/nfhs.csv");

        let err = IngestError::DuplicateColumn {
            column: "source".to_string(),
            source_name: "nfhs.csv".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate column 'source' in nfhs.csv");
    }
}
