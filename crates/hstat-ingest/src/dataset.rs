use std::path::Path;

use tracing::info;

use hstat_model::Record;

use crate::error::Result;
use crate::metadata::{DatasetMetadata, load_sidecar_metadata};
use crate::reader::read_records;

/// A loaded dataset: its rows plus whatever its sidecar says about them.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File stem of the source CSV.
    pub name: String,
    pub records: Vec<Record>,
    pub metadata: DatasetMetadata,
}

impl Dataset {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
            metadata: DatasetMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Read a CSV dataset together with its optional sidecar metadata.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let records = read_records(path)?;
    let metadata = load_sidecar_metadata(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        dataset = %name,
        records = records.len(),
        transformers = metadata.transformers.len(),
        "dataset loaded"
    );
    Ok(Dataset {
        name,
        records,
        metadata,
    })
}
