//! Rule-table driven record expansion.

use tracing::{trace, warn};

use hstat_model::Record;

use crate::error::TransformError;
use crate::report::FailureReport;
use crate::rule_table::RuleTable;
use crate::transformer::Transformer;
use crate::unmatched::UnmatchedRegistry;

/// Looks each record up in a [`RuleTable`] and emits one record per
/// matching rule row.
///
/// Matching ignores case and surrounding whitespace on every key field, on
/// both the table side and the record side. Keys with no rule are kept in an
/// [`UnmatchedRegistry`] for later review.
#[derive(Debug, Clone)]
pub struct RuleLookupTransformer {
    name: String,
    table: RuleTable,
    unmatched: UnmatchedRegistry,
}

impl RuleLookupTransformer {
    pub fn new(name: impl Into<String>, table: RuleTable) -> Self {
        Self {
            name: name.into(),
            table,
            unmatched: UnmatchedRegistry::new(),
        }
    }

    pub fn rule_table(&self) -> &RuleTable {
        &self.table
    }

    pub fn unmatched(&self) -> &UnmatchedRegistry {
        &self.unmatched
    }
}

impl Transformer for RuleLookupTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&mut self, record: &Record) -> Result<Vec<Record>, TransformError> {
        let key = self.table.key_for(record);
        if let Some(rows) = self.table.lookup(&key) {
            trace!(transformer = %self.name, %key, matches = rows.len(), "rule matched");
            return Ok(rows.iter().map(|row| row.apply_to(record)).collect());
        }
        if self.unmatched.register(key.clone(), record) {
            warn!(transformer = %self.name, %key, "no rule matches key");
        }
        Err(TransformError::UnknownValue {
            transformer: self.name.clone(),
            key,
        })
    }

    fn failure_report(&self) -> Option<FailureReport> {
        if self.unmatched.is_empty() {
            return None;
        }
        Some(FailureReport {
            transformer: self.name.clone(),
            key_columns: self.table.key_columns().to_vec(),
            entries: self.unmatched.entries().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_table() -> RuleTable {
        RuleTable::from_reader(
            "match source,source\nnfhs4,NFHS-4\n".as_bytes(),
            "source.csv",
        )
        .unwrap()
    }

    #[test]
    fn match_overwrites_only_rule_fields() {
        let mut transformer = RuleLookupTransformer::new("source", source_table());
        let input = Record::from_iter([("source", "NFHS4"), ("value", "12.5")]);

        let out = transformer.transform(&input).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("source"), Some("NFHS-4"));
        assert_eq!(out[0].get("value"), Some("12.5"));
        assert_eq!(input.get("source"), Some("NFHS4"));
        assert!(transformer.failure_report().is_none());
    }

    #[test]
    fn miss_registers_key_once() {
        let mut transformer = RuleLookupTransformer::new("source", source_table());
        let input = Record::from_iter([("source", "NFHS9")]);

        for _ in 0..3 {
            let err = transformer.transform(&input).unwrap_err();
            assert!(matches!(err, TransformError::UnknownValue { .. }));
        }

        assert_eq!(transformer.unmatched().len(), 1);
        let report = transformer.failure_report().unwrap();
        assert_eq!(report.entries[0].occurrences, 3);
    }
}
