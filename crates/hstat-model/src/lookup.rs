use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Record;

/// Normalize a value for rule matching: trimmed and lower-cased.
pub fn normalize_key_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalized sub-mapping of a record's key fields.
///
/// Two keys are equal when they hold the same field → value pairs; the
/// order fields were supplied in does not matter.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LookupKey(BTreeMap<String, String>);

impl LookupKey {
    /// Build a key from raw pairs, normalizing every value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(field, value)| (field.into(), normalize_key_value(value.as_ref())))
                .collect(),
        )
    }

    /// Project `record` onto `columns`. Missing fields count as empty.
    pub fn from_record<S: AsRef<str>>(record: &Record, columns: &[S]) -> Self {
        Self::from_pairs(columns.iter().map(|column| {
            let column = column.as_ref();
            (column, record.get(column).unwrap_or(""))
        }))
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, value) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{field}={value:?}")?;
        }
        Ok(())
    }
}
