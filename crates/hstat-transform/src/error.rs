//! Error types for rule loading and record transformation.

use std::path::PathBuf;

use hstat_model::LookupKey;
use thiserror::Error;

/// Per-record transformation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// No rule matched the record's lookup key. The record passes through.
    #[error("no rule in '{transformer}' matches {key}")]
    UnknownValue {
        transformer: String,
        key: LookupKey,
    },

    /// Several entity fields and no district/state field to pick between them.
    #[error("cannot determine entity type from conflicting fields: {}", .fields.join(", "))]
    ConflictingEntity { fields: Vec<String> },
}

impl TransformError {
    /// Whether the chain keeps the record unchanged instead of rejecting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownValue { .. })
    }
}

/// Failures while building rule tables or transformer chains.
///
/// Any of these aborts initialization of the whole transformer set: a broken
/// rule file has to be fixed before ingestion can run.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("rule file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rule table {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("rule table {source_name} has no 'match ' key columns")]
    NoKeyColumns { source_name: String },

    #[error("blank column name at position {position} in rule table {source_name}")]
    BlankColumn { position: usize, source_name: String },

    #[error("duplicate column '{column}' in rule table {source_name}")]
    DuplicateColumn { column: String, source_name: String },

    #[error("invalid transformer name '{name}'")]
    InvalidTransformerName { name: String },
}

/// Failures while writing a failure report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render report: {0}")]
    Csv(#[from] csv::Error),
}
