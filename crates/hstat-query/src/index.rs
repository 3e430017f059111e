//! The search-index seam used by the query layer.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use hstat_model::Record;

use crate::compiler::Query;
use crate::error::Result;

/// One distinct combination of field values.
pub type TermCombination = BTreeMap<String, String>;

/// Cursor returned by a composite aggregation page: the last bucket's key.
pub type AfterKey = BTreeMap<String, String>;

/// A single page request of a composite terms aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    pub query: Query,
    /// Fields to group by, each sorted ascending, in priority order.
    pub sources: Vec<String>,
    pub size: usize,
    pub after: Option<AfterKey>,
}

impl CompositeRequest {
    /// Render as a search body with a size-0 hit list and one composite
    /// aggregation named `terms`.
    pub fn to_json(&self) -> Value {
        let sources: Vec<Value> = self
            .sources
            .iter()
            .map(|field| {
                let mut source = serde_json::Map::new();
                source.insert(
                    field.clone(),
                    json!({ "terms": { "field": field, "order": "asc" } }),
                );
                Value::Object(source)
            })
            .collect();
        let mut composite = json!({ "size": self.size, "sources": sources });
        if let (Some(after), Value::Object(body)) = (&self.after, &mut composite) {
            body.insert("after".to_string(), json!(after));
        }
        json!({
            "size": 0,
            "query": self.query.to_json(),
            "aggs": { "terms": { "composite": composite } },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: TermCombination,
    pub doc_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositePage {
    pub buckets: Vec<Bucket>,
    /// `None` (or an empty map) once the aggregation is exhausted.
    pub after_key: Option<AfterKey>,
}

/// Client for a term/range-filterable document index.
///
/// Implementations that are `Sync` can serve several enumerations at once;
/// the enumerator only ever holds a shared reference.
pub trait SearchIndex {
    /// Documents matching `query`, at most `limit` of them.
    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Record>>;

    /// One page of a composite terms aggregation.
    fn composite(&self, request: &CompositeRequest) -> Result<CompositePage>;
}

impl<T: SearchIndex + ?Sized> SearchIndex for &T {
    fn search(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        (**self).search(query, limit)
    }

    fn composite(&self, request: &CompositeRequest) -> Result<CompositePage> {
        (**self).composite(request)
    }
}
