//! File-system tests for dataset reading and writing.

use std::fs;

use hstat_ingest::{IngestError, read_dataset, read_records, write_records};
use hstat_model::Record;
use tempfile::TempDir;

#[test]
fn read_dataset_with_sidecar() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("nfhs4.csv");
    fs::write(
        &csv_path,
        "source,indicator,entity.state\nNFHS4,MMRate,Kerala\nNFHS4,IMR,Goa\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("nfhs4.meta.json"),
        r#"{"fields":[{"name":"source","description":"Survey round"}],"transformers":["source","entity-type"]}"#,
    )
    .unwrap();

    let dataset = read_dataset(&csv_path).unwrap();

    assert_eq!(dataset.name, "nfhs4");
    assert_eq!(dataset.records.len(), 2);
    assert_eq!(dataset.records[1].get("entity.state"), Some("Goa"));
    assert_eq!(dataset.metadata.transformers, vec!["source", "entity-type"]);
    assert_eq!(dataset.metadata.description_of("source"), Some("Survey round"));
}

#[test]
fn read_dataset_without_sidecar_has_default_metadata() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("plain.csv");
    fs::write(&csv_path, "source\nNFHS4\n").unwrap();

    let dataset = read_dataset(&csv_path).unwrap();
    assert!(dataset.metadata.transformers.is_empty());
}

#[test]
fn broken_sidecar_is_an_error() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("bad.csv");
    fs::write(&csv_path, "source\nNFHS4\n").unwrap();
    fs::write(dir.path().join("bad.meta.json"), "{not json").unwrap();

    let err = read_dataset(&csv_path).unwrap_err();
    assert!(matches!(err, IngestError::MetadataParse { .. }));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = read_records(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn written_records_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let records = vec![
        Record::from_iter([("source", "NFHS-4"), ("meta.original.source", "NFHS4")]),
        Record::from_iter([("source", "NFHS-5")]),
    ];

    write_records(&path, &records).unwrap();
    let back = read_records(&path).unwrap();

    assert_eq!(back, records);
}
