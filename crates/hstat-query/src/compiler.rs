//! Filter compilation into the index's boolean query language.
//!
//! Every restriction in a [`Filter`] becomes a non-scoring `filter` clause
//! of one top-level bool query, so clauses are AND-combined. A `null` in a
//! terms list widens that field's clause to "one of these values, or the
//! field is missing":
//!
//! ```text
//! {"terms": {"source": ["A", null]}}
//!   => bool.filter[ bool { should: [ terms(source: [A]),
//!                                    bool { must_not: [exists(source)] } ],
//!                          minimum_should_match: 1 } ]
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Value, json};

use hstat_model::{Filter, RangeBounds, Record};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolQuery {
    pub filter: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<usize>,
}

/// Typed query tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Bool(BoolQuery),
    /// Field value is one of `values`.
    Terms { field: String, values: Vec<String> },
    Exists { field: String },
    Range { field: String, bounds: RangeBounds },
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl Query {
    /// An empty bool query, which every document satisfies.
    pub fn match_all() -> Self {
        Self::Bool(BoolQuery::default())
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::Bool(b) if *b == BoolQuery::default())
    }

    /// Render in the index's JSON query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => {
                let mut body = Map::new();
                for (name, clauses) in [
                    ("filter", &b.filter),
                    ("should", &b.should),
                    ("must_not", &b.must_not),
                ] {
                    if !clauses.is_empty() {
                        body.insert(
                            name.to_string(),
                            Value::Array(clauses.iter().map(Query::to_json).collect()),
                        );
                    }
                }
                if let Some(minimum) = b.minimum_should_match {
                    body.insert("minimum_should_match".to_string(), json!(minimum));
                }
                json!({ "bool": body })
            }
            Self::Terms { field, values } => json!({ "terms": keyed(field, json!(values)) }),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::Range { field, bounds } => {
                let mut body = Map::new();
                for (name, bound) in [
                    ("gt", &bounds.gt),
                    ("gte", &bounds.gte),
                    ("lt", &bounds.lt),
                    ("lte", &bounds.lte),
                ] {
                    if let Some(bound) = bound {
                        body.insert(name.to_string(), json!(bound));
                    }
                }
                json!({ "range": keyed(field, Value::Object(body)) })
            }
        }
    }

    /// Evaluate against a single record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Bool(b) => {
                let should_ok = b.should.is_empty() || {
                    let required = b.minimum_should_match.unwrap_or(1);
                    b.should.iter().filter(|q| q.matches(record)).count() >= required
                };
                b.filter.iter().all(|q| q.matches(record))
                    && should_ok
                    && !b.must_not.iter().any(|q| q.matches(record))
            }
            Self::Terms { field, values } => record
                .get(field)
                .is_some_and(|value| values.iter().any(|allowed| allowed == value)),
            Self::Exists { field } => record.contains(field),
            Self::Range { field, bounds } => record
                .get(field)
                .is_some_and(|value| within(value, bounds)),
        }
    }
}

fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Numeric when both sides parse as numbers, lexicographic otherwise.
fn compare(value: &str, bound: &str) -> Ordering {
    match (value.trim().parse::<f64>(), bound.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or_else(|| value.cmp(bound)),
        _ => value.cmp(bound),
    }
}

fn within(value: &str, bounds: &RangeBounds) -> bool {
    let check = |bound: &Option<String>, accept: fn(Ordering) -> bool| {
        bound
            .as_deref()
            .is_none_or(|bound| accept(compare(value, bound)))
    };
    check(&bounds.gt, Ordering::is_gt)
        && check(&bounds.gte, Ordering::is_ge)
        && check(&bounds.lt, Ordering::is_lt)
        && check(&bounds.lte, Ordering::is_le)
}

fn compile_terms(field: &str, values: &[Option<String>]) -> Option<Query> {
    let mut present: Vec<String> = values.iter().flatten().cloned().collect();
    present.sort();
    present.dedup();
    let or_missing = values.iter().any(Option::is_none);

    let terms = (!present.is_empty()).then(|| Query::Terms {
        field: field.to_string(),
        values: present,
    });
    if !or_missing {
        return terms;
    }
    let missing = Query::Bool(BoolQuery {
        must_not: vec![Query::Exists {
            field: field.to_string(),
        }],
        ..BoolQuery::default()
    });
    Some(Query::Bool(BoolQuery {
        should: terms.into_iter().chain([missing]).collect(),
        minimum_should_match: Some(1),
        ..BoolQuery::default()
    }))
}

/// Compile a filter into a single bool query.
///
/// Fields are visited in sorted order and term values are sorted, so equal
/// filters always compile to equal queries. Empty term lists and unbounded
/// ranges contribute nothing; an empty filter compiles to
/// [`Query::match_all`].
pub fn compile_filter(filter: &Filter) -> Query {
    let mut clauses = Vec::new();
    if let Some(terms) = &filter.terms {
        clauses.extend(
            terms
                .iter()
                .filter_map(|(field, values)| compile_terms(field, values)),
        );
    }
    if let Some(ranges) = &filter.ranges {
        clauses.extend(
            ranges
                .iter()
                .filter(|(_, bounds)| !bounds.is_unbounded())
                .map(|(field, bounds)| Query::Range {
                    field: field.clone(),
                    bounds: bounds.clone(),
                }),
        );
    }
    Query::Bool(BoolQuery {
        filter: clauses,
        ..BoolQuery::default()
    })
}
