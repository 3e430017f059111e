//! Filter specification shared by the query layer and its callers.
//!
//! A filter is a set of `terms` (allowed values per field) and `ranges`
//! (bounds per field). In JSON a `null` inside a terms list means "the field
//! is absent", so `{"terms": {"source": ["A", null]}}` matches records whose
//! source is `A` as well as records with no source at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Bounds of a range clause. Absent bounds leave that side open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
}

impl RangeBounds {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lt(mut self, bound: impl Into<String>) -> Self {
        self.lt = Some(bound.into());
        self
    }

    #[must_use]
    pub fn lte(mut self, bound: impl Into<String>) -> Self {
        self.lte = Some(bound.into());
        self
    }

    #[must_use]
    pub fn gt(mut self, bound: impl Into<String>) -> Self {
        self.gt = Some(bound.into());
        self
    }

    #[must_use]
    pub fn gte(mut self, bound: impl Into<String>) -> Self {
        self.gte = Some(bound.into());
        self
    }

    /// True when no side is constrained.
    pub fn is_unbounded(&self) -> bool {
        self.lt.is_none() && self.lte.is_none() && self.gt.is_none() && self.gte.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field → allowed values. `None` is the "field is absent" sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<BTreeMap<String, Vec<Option<String>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<BTreeMap<String, RangeBounds>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from its JSON form.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Allow `values` for `field`, in addition to any already allowed.
    #[must_use]
    pub fn terms<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.term_list(field)
            .extend(values.into_iter().map(|value| Some(value.into())));
        self
    }

    /// Also match records where `field` is absent.
    #[must_use]
    pub fn or_missing(mut self, field: impl Into<String>) -> Self {
        self.term_list(field).push(None);
        self
    }

    #[must_use]
    pub fn range(mut self, field: impl Into<String>, bounds: RangeBounds) -> Self {
        self.ranges
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), bounds);
        self
    }

    /// True when the filter places no restriction at all.
    ///
    /// Entries that compile to nothing (empty value lists, unbounded ranges)
    /// count as no restriction.
    pub fn is_empty(&self) -> bool {
        let no_terms = self
            .terms
            .as_ref()
            .is_none_or(|terms| terms.values().all(Vec::is_empty));
        let no_ranges = self
            .ranges
            .as_ref()
            .is_none_or(|ranges| ranges.values().all(RangeBounds::is_unbounded));
        no_terms && no_ranges
    }

    fn term_list(&mut self, field: impl Into<String>) -> &mut Vec<Option<String>> {
        self.terms
            .get_or_insert_with(BTreeMap::new)
            .entry(field.into())
            .or_default()
    }
}
