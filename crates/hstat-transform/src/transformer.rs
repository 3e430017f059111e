use hstat_model::Record;

use crate::error::TransformError;
use crate::report::FailureReport;

/// One step of a transform chain.
///
/// A transformer maps one record to zero or more records. It never modifies
/// its input: every returned record is a fresh value. Transformers that keep
/// failure bookkeeping own it and expose it through
/// [`Transformer::failure_report`].
pub trait Transformer: Send {
    /// Name used in logs, summaries, and report file names.
    fn name(&self) -> &str;

    /// Transform a single record.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnknownValue`] when a lookup finds no rule (the
    /// chain passes the record through unchanged), or a fatal error that
    /// rejects the record.
    fn transform(&mut self, record: &Record) -> Result<Vec<Record>, TransformError>;

    /// Keys this transformer could not resolve so far, if it tracks any.
    fn failure_report(&self) -> Option<FailureReport> {
        None
    }
}
