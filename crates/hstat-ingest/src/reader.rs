//! Headered CSV → [`Record`] reading.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use hstat_model::Record;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Validate and normalize a header row.
fn read_headers(raw: &csv::StringRecord, source_name: &str) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (position, cell) in raw.iter().enumerate() {
        let header = normalize_header(cell);
        if header.is_empty() {
            return Err(IngestError::BlankColumn {
                position,
                source_name: source_name.to_string(),
            });
        }
        if !seen.insert(header.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: header,
                source_name: source_name.to_string(),
            });
        }
        headers.push(header);
    }
    if headers.is_empty() {
        return Err(IngestError::MissingHeader {
            source_name: source_name.to_string(),
        });
    }
    Ok(headers)
}

/// Read records from any CSV source.
///
/// Empty cells are left out of the record so that "absent" and "blank"
/// are the same thing downstream. Fully blank lines are skipped; short rows
/// are padded, extra trailing cells are ignored.
pub fn read_records_from<R: Read>(input: R, source_name: &str) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let csv_error = |source| IngestError::CsvParse {
        source_name: source_name.to_string(),
        source,
    };
    let headers = read_headers(reader.headers().map_err(csv_error)?, source_name)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.as_str(), normalize_cell(cell)))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        if record.is_empty() {
            continue;
        }
        records.push(record);
    }
    debug!(
        source = source_name,
        columns = headers.len(),
        records = records.len(),
        "read csv records"
    );
    Ok(records)
}

/// Read records from a CSV file on disk.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_records_from(file, &path.display().to_string())
}
