//! End-to-end tests for transform chains built from rule files.

use std::fs;
use std::path::Path;

use hstat_model::Record;
use hstat_transform::{TransformError, TransformerRegistry};
use tempfile::TempDir;

const SOURCE_RULES: &str = "\
match source,match indicator,source,indicator
NFHS4,MMRate,NFHS-4,Maternal mortality
NFHS4,MMRate,NFHS-4,Maternal mortality ratio
NFHS4,IMR,NFHS-4,
";

fn rules_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("source.csv"), SOURCE_RULES).unwrap();
    dir
}

fn registry(dir: &Path) -> TransformerRegistry {
    TransformerRegistry::new(dir)
}

#[test]
fn matching_record_expands_in_rule_order() {
    let dir = rules_dir();
    let mut chain = registry(dir.path()).build_chain(["source"]).unwrap();
    let input = Record::from_iter([
        ("source", "NFHS4 "),
        ("indicator", "mmrate"),
        ("value", "130"),
    ]);

    let outcome = chain.apply(vec![input]);

    let indicators: Vec<Option<&str>> =
        outcome.records.iter().map(|r| r.get("indicator")).collect();
    assert_eq!(
        indicators,
        vec![Some("Maternal mortality"), Some("Maternal mortality ratio")]
    );
    for record in &outcome.records {
        assert_eq!(record.get("source"), Some("NFHS-4"));
        assert_eq!(record.get("value"), Some("130"));
        assert_eq!(record.get("meta.original.source"), Some("NFHS4 "));
        assert_eq!(record.get("meta.original.indicator"), Some("mmrate"));
    }
    assert!(chain.failure_reports().is_empty());
}

#[test]
fn empty_rule_cells_leave_fields_alone() {
    let dir = rules_dir();
    let mut chain = registry(dir.path()).build_chain(["source"]).unwrap();
    let input = Record::from_iter([("source", "nfhs4"), ("indicator", "IMR")]);

    let outcome = chain.apply(vec![input]);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].get("source"), Some("NFHS-4"));
    assert_eq!(outcome.records[0].get("indicator"), Some("IMR"));
}

#[test]
fn unmatched_record_passes_through_and_is_reported_once() {
    let dir = rules_dir();
    let mut chain = registry(dir.path())
        .build_chain(["source", "entity-type"])
        .unwrap();
    let unknown = Record::from_iter([
        ("source", "DLHS"),
        ("indicator", "MMRate"),
        ("entity.state", "Kerala"),
    ]);

    let outcome = chain.apply(vec![unknown.clone(), unknown.clone()]);

    assert_eq!(outcome.records.len(), 2);
    let mut expected = unknown.clone();
    expected.stamp_original_values();
    expected.insert("entity.type", "STATE");
    assert_eq!(outcome.records[0], expected);
    assert_eq!(outcome.stats[0].unmatched, 2);

    let reports = chain.failure_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].transformer, "source");
    assert_eq!(reports[0].entries.len(), 1);
    assert_eq!(reports[0].entries[0].occurrences, 2);
    assert_eq!(reports[0].entries[0].key.get("source"), Some("dlhs"));
}

#[test]
fn rejected_record_does_not_stop_the_batch() {
    let dir = rules_dir();
    let mut chain = registry(dir.path())
        .build_chain(["entity-type", "source"])
        .unwrap();
    let conflicting = Record::from_iter([("entity.block", "A"), ("entity.village", "B")]);
    let good = Record::from_iter([
        ("source", "NFHS4"),
        ("indicator", "MMRate"),
        ("entity.district", "Patna"),
    ]);

    let outcome = chain.apply(vec![conflicting, good]);

    assert_eq!(outcome.rejected.len(), 1);
    assert!(matches!(
        outcome.rejected[0].error,
        TransformError::ConflictingEntity { .. }
    ));
    assert_eq!(outcome.records.len(), 2);
    assert!(
        outcome
            .records
            .iter()
            .all(|r| r.get("entity.type") == Some("DISTRICT"))
    );
}

#[test]
fn rebuilding_a_chain_gives_the_same_result() {
    let dir = rules_dir();
    let registry = registry(dir.path());
    let input = vec![
        Record::from_iter([("source", "NFHS4"), ("indicator", "MMRate")]),
        Record::from_iter([("duration.start", "1-1-15"), ("duration.end", "31-12-15")]),
    ];

    let names = ["source", "date", "entity-type"];
    let first = registry.build_chain(names).unwrap().apply(input.clone());
    let second = registry.build_chain(names).unwrap().apply(input);

    assert_eq!(first.records, second.records);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn ragged_rule_file_aborts_chain_build() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.csv"),
        "match source,source\nNFHS4,NFHS-4,extra\n",
    )
    .unwrap();

    let err = registry(dir.path())
        .build_chain(["date", "broken"])
        .unwrap_err();

    assert!(err.to_string().contains("broken.csv"), "{err}");
}
