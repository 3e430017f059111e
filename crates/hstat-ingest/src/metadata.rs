//! Sidecar metadata describing a dataset.
//!
//! A dataset `nfhs4.csv` may carry a `nfhs4.meta.json` next to it:
//!
//! ```json
//! {
//!   "fields": [{ "name": "source", "description": "Survey round" }],
//!   "transformers": ["source", "date", "entity-type"]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
    /// Transformer names applied to this dataset, in chain order.
    #[serde(default)]
    pub transformers: Vec<String>,
}

impl DatasetMetadata {
    pub fn description_of(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.description.as_str())
    }
}

/// Sidecar path for a dataset file: `dir/name.csv` → `dir/name.meta.json`.
pub fn metadata_path_for(dataset: &Path) -> PathBuf {
    let stem = dataset
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dataset.with_file_name(format!("{stem}.meta.json"))
}

/// Load metadata from a JSON file.
pub fn load_metadata(path: &Path) -> Result<DatasetMetadata> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IngestError::MetadataParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the sidecar metadata for a dataset, or defaults when there is none.
pub fn load_sidecar_metadata(dataset: &Path) -> Result<DatasetMetadata> {
    let path = metadata_path_for(dataset);
    if path.is_file() {
        load_metadata(&path)
    } else {
        Ok(DatasetMetadata::default())
    }
}
