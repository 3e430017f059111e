//! Dataset ingestion for the health-statistics pipeline.
//!
//! Reads headered CSV tables into [`hstat_model::Record`]s, loads the
//! optional sidecar metadata that names the transformers for a dataset, and
//! writes transformed records back out.

pub mod dataset;
pub mod error;
pub mod metadata;
pub mod options;
pub mod reader;
pub mod writer;

pub use dataset::{Dataset, read_dataset};
pub use error::{IngestError, Result};
pub use metadata::{
    DatasetMetadata, FieldDescription, load_metadata, load_sidecar_metadata, metadata_path_for,
};
pub use options::{DEFAULT_BATCH_SIZE, IngestOptions, batches};
pub use reader::{read_records, read_records_from};
pub use writer::{column_union, write_records, write_records_to};
