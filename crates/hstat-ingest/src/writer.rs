//! [`Record`] → CSV writing.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use hstat_model::Record;

use crate::error::{IngestError, Result};

/// Union of all field names across `records`, sorted.
pub fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns = BTreeSet::new();
    for record in records {
        columns.extend(record.field_names().map(str::to_string));
    }
    columns.into_iter().collect()
}

/// Write records as CSV. Fields a record lacks are written as empty cells.
pub fn write_records_to<W: Write>(output: W, records: &[Record], target: &str) -> Result<()> {
    let csv_error = |source| IngestError::CsvWrite {
        target: target.to_string(),
        source,
    };
    let columns = column_union(records);
    let mut writer = csv::Writer::from_writer(output);
    if columns.is_empty() {
        return Ok(());
    }
    writer.write_record(&columns).map_err(csv_error)?;
    for record in records {
        writer
            .write_record(columns.iter().map(|c| record.get(c).unwrap_or("")))
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: target.into(),
        source,
    })
}

/// Write records to a CSV file, replacing it if it exists.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_records_to(file, records, &path.display().to_string())
}
