#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Namespace holding the pre-transform value of every field.
pub const ORIGINAL_PREFIX: &str = "meta.original.";

/// Audit field name for `field`, e.g. `source` -> `meta.original.source`.
pub fn original_field(field: &str) -> String {
    format!("{ORIGINAL_PREFIX}{field}")
}

/// One dataset row.
///
/// Field names are dot-namespaced opaque strings (`entity.district`,
/// `duration.start`). Fields iterate in name order so records written out
/// side by side share a stable column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set a field, returning the previous value if there was one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }

    /// Set a field after checking the name is usable as a column header.
    pub fn try_insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ModelError> {
        let field = field.into();
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed.len() != field.len() {
            return Err(ModelError::InvalidFieldName(field));
        }
        Ok(self.fields.insert(field, value.into()))
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    /// Overwrite fields with the given pairs; fields not mentioned are kept.
    pub fn merge<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, value) in pairs {
            self.fields.insert(field.into(), value.into());
        }
    }

    /// Copy every current field into `meta.original.<field>`.
    ///
    /// Called once before any transform runs so the pre-transform value
    /// survives whatever later stages do to the field itself.
    pub fn stamp_original_values(&mut self) {
        let originals: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(field, value)| (original_field(field), value.clone()))
            .collect();
        self.fields.extend(originals);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields under a namespace prefix such as `entity.`.
    pub fn fields_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.fields
            .range(prefix.to_string()..)
            .take_while(move |(field, _)| field.starts_with(prefix))
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        record.merge(iter);
        record
    }
}

impl From<BTreeMap<String, String>> for Record {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

impl From<Record> for BTreeMap<String, String> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

impl IntoIterator for Record {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
