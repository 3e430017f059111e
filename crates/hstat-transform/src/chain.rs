//! Ordered execution of transformers over a batch of records.
//!
//! Each stage folds the working list into a new one: a record that expands
//! is replaced by its outputs, in place, so input order and per-input
//! expansion order both survive every stage.
//!
//! ```
//! use hstat_model::Record;
//! use hstat_transform::{DateTransformer, TransformChain};
//!
//! let mut chain = TransformChain::new().with(DateTransformer::new());
//! let outcome = chain.apply(vec![Record::from_iter([("duration.start", "1-2-99")])]);
//! assert_eq!(outcome.records[0].get("duration.start"), Some("2099-2-1"));
//! assert_eq!(outcome.records[0].get("meta.original.duration.start"), Some("1-2-99"));
//! ```

use std::time::Instant;

use tracing::{error, info, info_span};

use hstat_model::Record;

use crate::error::TransformError;
use crate::report::FailureReport;
use crate::transformer::Transformer;

/// A record dropped from the batch by a fatal transformer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub transformer: String,
    pub error: TransformError,
    pub record: Record,
}

/// Counters for one transformer over one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageStats {
    pub transformer: String,
    pub input: usize,
    pub output: usize,
    /// Records passed through because no rule matched.
    pub unmatched: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedRecord>,
    pub stats: Vec<StageStats>,
}

impl ChainOutcome {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// An ordered list of transformers.
#[derive(Default)]
pub struct TransformChain {
    transformers: Vec<Box<dyn Transformer>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transformer: Box<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    /// Builder form of [`TransformChain::push`].
    pub fn with(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Run every transformer over `records`.
    ///
    /// Inputs are stamped with `meta.original.*` copies first. Unknown-value
    /// failures keep the record unchanged; fatal failures drop it into
    /// [`ChainOutcome::rejected`] and the rest of the batch continues.
    pub fn apply(&mut self, records: Vec<Record>) -> ChainOutcome {
        let mut working: Vec<Record> = records
            .into_iter()
            .map(|mut record| {
                record.stamp_original_values();
                record
            })
            .collect();
        let mut rejected = Vec::new();
        let mut stats = Vec::with_capacity(self.transformers.len());

        for transformer in &mut self.transformers {
            let name = transformer.name().to_string();
            let span = info_span!("transform_stage", transformer = %name);
            let _guard = span.enter();
            let start = Instant::now();
            let mut stage = StageStats {
                transformer: name.clone(),
                input: working.len(),
                ..StageStats::default()
            };

            let mut next = Vec::with_capacity(working.len());
            for record in working {
                match transformer.transform(&record) {
                    Ok(outputs) => next.extend(outputs),
                    Err(err) if err.is_recoverable() => {
                        stage.unmatched += 1;
                        next.push(record);
                    }
                    Err(err) => {
                        error!(transformer = %name, error = %err, "record rejected");
                        stage.rejected += 1;
                        rejected.push(RejectedRecord {
                            transformer: name.clone(),
                            error: err,
                            record,
                        });
                    }
                }
            }
            working = next;
            stage.output = working.len();

            info!(
                transformer = %name,
                input = stage.input,
                output = stage.output,
                unmatched = stage.unmatched,
                rejected = stage.rejected,
                duration_ms = start.elapsed().as_millis(),
                "stage complete"
            );
            stats.push(stage);
        }

        ChainOutcome {
            records: working,
            rejected,
            stats,
        }
    }

    /// One report per transformer that has unresolved keys.
    pub fn failure_reports(&self) -> Vec<FailureReport> {
        self.transformers
            .iter()
            .filter_map(|t| t.failure_report())
            .filter(|report| !report.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformChain")
            .field("transformers", &self.names())
            .finish()
    }
}

/// Apply `chain` to `records`. Shorthand for [`TransformChain::apply`].
pub fn apply_transforms(chain: &mut TransformChain, records: Vec<Record>) -> ChainOutcome {
    chain.apply(records)
}
