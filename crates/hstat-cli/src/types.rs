use std::path::PathBuf;

use hstat_transform::{RejectedRecord, StageStats};

/// What a `transform` run produced.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataset: String,
    pub input_records: usize,
    pub output_records: usize,
    pub output: PathBuf,
    pub stages: Vec<StageStats>,
    pub rejected: Vec<RejectedRecord>,
    /// Unmatched-key report files, one per lookup transformer with misses.
    pub reports: Vec<PathBuf>,
}

impl TransformResult {
    pub fn has_errors(&self) -> bool {
        !self.rejected.is_empty()
    }
}
