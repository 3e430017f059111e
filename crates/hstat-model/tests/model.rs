//! Integration tests for the shared model types.

use hstat_model::{Filter, LookupKey, RangeBounds, Record, original_field};

#[test]
fn filter_json_null_is_missing_sentinel() {
    let filter = Filter::from_json(
        r#"{"terms": {"source": ["A", null]}, "ranges": {"year": {"gte": "2000"}}}"#,
    )
    .expect("parse filter");

    let terms = filter.terms.as_ref().expect("terms");
    assert_eq!(terms["source"], vec![Some("A".to_string()), None]);

    let ranges = filter.ranges.as_ref().expect("ranges");
    assert_eq!(ranges["year"], RangeBounds::new().gte("2000"));
}

#[test]
fn filter_builder_matches_json_form() {
    let built = Filter::new()
        .terms("source", ["A"])
        .or_missing("source")
        .range("year", RangeBounds::new().gte("2000"));
    let parsed = Filter::from_json(
        r#"{"terms": {"source": ["A", null]}, "ranges": {"year": {"gte": "2000"}}}"#,
    )
    .expect("parse filter");
    assert_eq!(built, parsed);
}

#[test]
fn filter_emptiness() {
    assert!(Filter::new().is_empty());
    assert!(Filter::from_json("{}").expect("parse").is_empty());
    assert!(
        Filter::new()
            .terms("source", Vec::<String>::new())
            .range("year", RangeBounds::new())
            .is_empty()
    );
    assert!(!Filter::new().or_missing("source").is_empty());
    assert!(!Filter::new().range("year", RangeBounds::new().lt("2010")).is_empty());
}

#[test]
fn filter_rejects_malformed_json() {
    assert!(Filter::from_json(r#"{"terms": ["source"]}"#).is_err());
}

#[test]
fn filter_serializes_without_absent_parts() {
    let filter = Filter::new().range("year", RangeBounds::new().gte("2000"));
    let json = serde_json::to_string(&filter).expect("serialize");
    assert_eq!(json, r#"{"ranges":{"year":{"gte":"2000"}}}"#);
}

#[test]
fn record_round_trips_as_flat_json_object() {
    let record = Record::from_iter([("entity.state", "Kerala"), ("source", "NFHS4")]);
    let json = serde_json::to_string(&record).expect("serialize");
    assert_eq!(json, r#"{"entity.state":"Kerala","source":"NFHS4"}"#);
    let back: Record = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, record);
}

#[test]
fn lookup_key_from_record_uses_only_key_columns() {
    let record = Record::from_iter([
        ("source", "NFHS4 "),
        ("indicator", "MMRate"),
        ("value", "12"),
    ]);
    let key = LookupKey::from_record(&record, &["source", "indicator"]);
    assert_eq!(
        key,
        LookupKey::from_pairs([("source", "nfhs4"), ("indicator", "mmrate")])
    );
    assert_eq!(key.get("value"), None);
}

#[test]
fn original_field_names() {
    assert_eq!(original_field("entity.state"), "meta.original.entity.state");
}
