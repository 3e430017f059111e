//! In-memory [`SearchIndex`] over a vector of records.

use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::debug;

use hstat_model::Record;

use crate::compiler::Query;
use crate::error::Result;
use crate::index::{AfterKey, Bucket, CompositePage, CompositeRequest, SearchIndex};

#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    documents: Vec<Record>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&mut self, record: Record) {
        self.documents.push(record);
    }

    /// Add a batch of documents, returning how many were added.
    pub fn index_batch<I: IntoIterator<Item = Record>>(&mut self, records: I) -> usize {
        let before = self.documents.len();
        self.documents.extend(records);
        let added = self.documents.len() - before;
        debug!(added, total = self.documents.len(), "batch indexed");
        added
    }

    pub fn documents(&self) -> &[Record] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Record> for MemoryIndex {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

/// Project `record` onto `sources`; `None` if any source field is missing.
fn source_values(record: &Record, sources: &[String]) -> Option<Vec<String>> {
    sources
        .iter()
        .map(|field| record.get(field).map(str::to_string))
        .collect()
}

fn to_key(sources: &[String], values: &[String]) -> AfterKey {
    sources.iter().cloned().zip(values.iter().cloned()).collect()
}

impl SearchIndex for MemoryIndex {
    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        Ok(self
            .documents
            .iter()
            .filter(|record| query.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }

    fn composite(&self, request: &CompositeRequest) -> Result<CompositePage> {
        let mut counts: BTreeMap<Vec<String>, usize> = BTreeMap::new();
        for record in self.documents.iter().filter(|r| request.query.matches(r)) {
            if let Some(values) = source_values(record, &request.sources) {
                *counts.entry(values).or_default() += 1;
            }
        }

        let start = match &request.after {
            Some(after) => {
                let cursor: Vec<String> = request
                    .sources
                    .iter()
                    .map(|field| after.get(field).cloned().unwrap_or_default())
                    .collect();
                Bound::Excluded(cursor)
            }
            None => Bound::Unbounded,
        };
        let buckets: Vec<Bucket> = counts
            .range((start, Bound::Unbounded))
            .take(request.size)
            .map(|(values, &doc_count)| Bucket {
                key: to_key(&request.sources, values),
                doc_count,
            })
            .collect();

        let after_key = if buckets.len() == request.size {
            buckets.last().map(|bucket| bucket.key.clone())
        } else {
            None
        };
        Ok(CompositePage { buckets, after_key })
    }
}
