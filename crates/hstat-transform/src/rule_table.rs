//! Lookup tables built from rule specification files.
//!
//! A rule file is a CSV whose header splits into key columns (prefixed with
//! `match `) and value columns (everything else). Each row is one rule:
//!
//! ```text
//! match source,match indicator,source,indicator2
//! NFHS4,MMRate,NFHS-4,Maternal mortality
//! NFHS4,MMRate,NFHS-4,Maternal mortality ratio
//! ```
//!
//! Key values are stored trimmed and lower-cased. Several rows may share a
//! key; all of them are kept, in file order, which is what lets one record
//! expand into many.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use hstat_model::{LookupKey, Record};

use crate::error::RuleLoadError;

/// Header prefix marking a key column.
pub const MATCH_PREFIX: &str = "match ";

/// Value fields a single rule sets on a matching record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleRow(BTreeMap<String, String>);

impl RuleRow {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Clone `record` and overwrite it with this rule's fields.
    pub fn apply_to(&self, record: &Record) -> Record {
        let mut out = record.clone();
        out.merge(self.iter());
        out
    }
}

/// Column role derived from a rule file header cell.
enum Column {
    Key(String),
    Value(String),
}

fn classify_header(raw: &str) -> Column {
    let header = raw.trim().trim_matches('\u{feff}');
    match header.get(..MATCH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(MATCH_PREFIX) => {
            Column::Key(header[MATCH_PREFIX.len()..].trim().to_string())
        }
        _ => Column::Value(header.to_string()),
    }
}

fn check_columns(columns: &[String], offset: usize, source_name: &str) -> Result<(), RuleLoadError> {
    let mut seen = BTreeSet::new();
    for (position, column) in columns.iter().enumerate() {
        if column.is_empty() {
            return Err(RuleLoadError::BlankColumn {
                position: offset + position,
                source_name: source_name.to_string(),
            });
        }
        if !seen.insert(column.as_str()) {
            return Err(RuleLoadError::DuplicateColumn {
                column: column.clone(),
                source_name: source_name.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    key_columns: Vec<String>,
    value_columns: Vec<String>,
    rules: HashMap<LookupKey, Vec<RuleRow>>,
    /// Keys in first-seen order, for rendering.
    key_order: Vec<LookupKey>,
    row_count: usize,
}

impl RuleTable {
    /// Create an empty table with the given columns.
    pub fn new(
        key_columns: Vec<String>,
        value_columns: Vec<String>,
    ) -> Result<Self, RuleLoadError> {
        Self::with_columns(key_columns, value_columns, "<inline>")
    }

    fn with_columns(
        key_columns: Vec<String>,
        value_columns: Vec<String>,
        source_name: &str,
    ) -> Result<Self, RuleLoadError> {
        if key_columns.is_empty() {
            return Err(RuleLoadError::NoKeyColumns {
                source_name: source_name.to_string(),
            });
        }
        // A value column may share a key column's name (the rule rewrites
        // the field it matched on); within each role names must be unique.
        check_columns(&key_columns, 0, source_name)?;
        check_columns(&value_columns, key_columns.len(), source_name)?;
        Ok(Self {
            key_columns,
            value_columns,
            rules: HashMap::new(),
            key_order: Vec::new(),
            row_count: 0,
        })
    }

    /// Parse a rule table from CSV. Any malformed row fails the whole load.
    pub fn from_reader<R: Read>(input: R, source_name: &str) -> Result<Self, RuleLoadError> {
        let csv_error = |source| RuleLoadError::Csv {
            source_name: source_name.to_string(),
            source,
        };
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
        let columns: Vec<Column> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(classify_header)
            .collect();

        let mut key_columns = Vec::new();
        let mut value_columns = Vec::new();
        for column in &columns {
            match column {
                Column::Key(name) => key_columns.push(name.clone()),
                Column::Value(name) => value_columns.push(name.clone()),
            }
        }
        let mut table = Self::with_columns(key_columns, value_columns, source_name)?;

        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            let mut key = Vec::with_capacity(table.key_columns.len());
            let mut values = Vec::new();
            for (column, cell) in columns.iter().zip(row.iter()) {
                match column {
                    Column::Key(name) => key.push((name.as_str(), cell)),
                    Column::Value(name) => {
                        let cell = cell.trim();
                        if !cell.is_empty() {
                            values.push((name.as_str(), cell));
                        }
                    }
                }
            }
            table.insert(LookupKey::from_pairs(key), RuleRow::from_pairs(values));
        }

        debug!(
            source = source_name,
            keys = table.key_count(),
            rows = table.len(),
            "rule table loaded"
        );
        Ok(table)
    }

    /// Load a rule table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, RuleLoadError> {
        if !path.is_file() {
            return Err(RuleLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| RuleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Append a rule. Rows for the same key keep their insertion order.
    pub fn insert(&mut self, key: LookupKey, row: RuleRow) {
        if !self.rules.contains_key(&key) {
            self.key_order.push(key.clone());
        }
        self.rules.entry(key).or_default().push(row);
        self.row_count += 1;
    }

    /// Lookup key of `record` against this table's key columns.
    pub fn key_for(&self, record: &Record) -> LookupKey {
        LookupKey::from_record(record, &self.key_columns)
    }

    /// All rules for `key`, in file order.
    pub fn lookup(&self, key: &LookupKey) -> Option<&[RuleRow]> {
        self.rules.get(key).map(Vec::as_slice)
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Keys with their rules, keys in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&LookupKey, &[RuleRow])> {
        self.key_order
            .iter()
            .filter_map(|key| self.rules.get(key).map(|rows| (key, rows.as_slice())))
    }

    /// Number of rule rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.key_order.len()
    }

    /// Header in rule-file form: `match <key>` columns, then value columns.
    pub fn header(&self) -> Vec<String> {
        self.key_columns
            .iter()
            .map(|c| format!("{MATCH_PREFIX}{c}"))
            .chain(self.value_columns.iter().cloned())
            .collect()
    }

    /// Rows as strings aligned with [`RuleTable::header`].
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.iter().flat_map(move |(key, rows)| {
            rows.iter().map(move |row| {
                self.key_columns
                    .iter()
                    .map(|c| key.get(c).unwrap_or_default().to_string())
                    .chain(
                        self.value_columns
                            .iter()
                            .map(|c| row.get(c).unwrap_or_default().to_string()),
                    )
                    .collect()
            })
        })
    }

    /// Render the table back to CSV (normalized keys, grouped by key).
    pub fn write_csv<W: Write>(&self, output: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(self.header())?;
        for row in self.rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE_RULES: &str = "\
match source,match indicator,source,indicator2
NFHS4,MMRate,NFHS-4,Maternal mortality
 nfhs4 , mmrate ,NFHS-4,Maternal mortality ratio
NFHS5,IMR,NFHS-5,
";

    #[test]
    fn headers_split_into_key_and_value_columns() {
        let table = RuleTable::from_reader(SOURCE_RULES.as_bytes(), "source.csv").unwrap();
        assert_eq!(table.key_columns(), ["source", "indicator"]);
        assert_eq!(table.value_columns(), ["source", "indicator2"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.key_count(), 2);
    }

    #[test]
    fn rows_sharing_a_normalized_key_accumulate_in_order() {
        let table = RuleTable::from_reader(SOURCE_RULES.as_bytes(), "source.csv").unwrap();
        let key = LookupKey::from_pairs([("source", "NFHS4"), ("indicator", "MMRATE")]);
        let rows = table.lookup(&key).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("indicator2"), Some("Maternal mortality"));
        assert_eq!(rows[1].get("indicator2"), Some("Maternal mortality ratio"));
    }

    #[test]
    fn empty_value_cells_are_not_part_of_the_rule() {
        let table = RuleTable::from_reader(SOURCE_RULES.as_bytes(), "source.csv").unwrap();
        let key = LookupKey::from_pairs([("source", "nfhs5"), ("indicator", "imr")]);
        let rows = table.lookup(&key).unwrap();
        assert_eq!(rows[0].get("indicator2"), None);
        assert_eq!(rows[0].get("source"), Some("NFHS-5"));
    }

    #[test]
    fn table_without_key_columns_fails_to_load() {
        let err = RuleTable::from_reader("source,value\na,b\n".as_bytes(), "bad.csv").unwrap_err();
        assert!(matches!(err, RuleLoadError::NoKeyColumns { .. }));
    }

    #[test]
    fn ragged_row_fails_to_load() {
        let err = RuleTable::from_reader("match a,b\n1,2,3\n".as_bytes(), "bad.csv").unwrap_err();
        assert!(matches!(err, RuleLoadError::Csv { .. }));
    }

    #[test]
    fn duplicate_key_column_fails_to_load() {
        let err = RuleTable::from_reader("match a,MATCH a,b\n1,2,3\n".as_bytes(), "bad.csv")
            .unwrap_err();
        assert!(matches!(err, RuleLoadError::DuplicateColumn { .. }));
    }

    #[test]
    fn renders_back_to_rule_file_form() {
        let table = RuleTable::from_reader(SOURCE_RULES.as_bytes(), "source.csv").unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "match source,match indicator,source,indicator2\n\
             nfhs4,mmrate,NFHS-4,Maternal mortality\n\
             nfhs4,mmrate,NFHS-4,Maternal mortality ratio\n\
             nfhs5,imr,NFHS-5,\n"
        );
    }
}
