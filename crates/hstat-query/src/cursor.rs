//! Exhaustive distinct-value enumeration through composite aggregation
//! cursors.
//!
//! The index returns at most one page of buckets per request together with
//! an `after_key`. [`TermPages`] feeds each `after_key` into the next
//! request until the index stops returning one.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hstat_model::Filter;

use crate::compiler::{Query, compile_filter};
use crate::error::{QueryError, Result};
use crate::index::{AfterKey, CompositeRequest, SearchIndex, TermCombination};

pub const DEFAULT_PAGE_SIZE: usize = 1_000;
pub const DEFAULT_MAX_PAGES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationOptions {
    /// Buckets requested per page.
    pub page_size: usize,
    /// Requests allowed before enumeration is abandoned.
    pub max_pages: usize,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl EnumerationOptions {
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Iterating(Option<AfterKey>),
    Done,
}

/// Iterator over composite aggregation pages, one request per item.
///
/// Yields `Err` at most once, after which iteration ends.
#[derive(Debug)]
pub struct TermPages<'a, I: ?Sized> {
    index: &'a I,
    query: Query,
    sources: Vec<String>,
    options: EnumerationOptions,
    state: CursorState,
    requests: usize,
}

impl<'a, I: SearchIndex + ?Sized> TermPages<'a, I> {
    pub fn new<S: AsRef<str>>(
        index: &'a I,
        fields: &[S],
        filter: &Filter,
        options: EnumerationOptions,
    ) -> Result<Self> {
        if fields.is_empty() {
            return Err(QueryError::NoFields);
        }
        Ok(Self {
            index,
            query: compile_filter(filter),
            sources: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            options,
            state: CursorState::Iterating(None),
            requests: 0,
        })
    }

    /// Requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn is_done(&self) -> bool {
        self.state == CursorState::Done
    }
}

impl<I: SearchIndex + ?Sized> Iterator for TermPages<'_, I> {
    type Item = Result<Vec<TermCombination>>;

    fn next(&mut self) -> Option<Self::Item> {
        let CursorState::Iterating(after) = std::mem::replace(&mut self.state, CursorState::Done)
        else {
            return None;
        };
        if self.requests >= self.options.max_pages {
            return Some(Err(QueryError::PageLimitExceeded {
                max_pages: self.options.max_pages,
            }));
        }

        let request = CompositeRequest {
            query: self.query.clone(),
            sources: self.sources.clone(),
            size: self.options.page_size.max(1),
            after,
        };
        self.requests += 1;
        let page = match self.index.composite(&request) {
            Ok(page) => page,
            Err(err) => return Some(Err(err)),
        };
        debug!(
            page = self.requests,
            buckets = page.buckets.len(),
            more = page.after_key.is_some(),
            "term page fetched"
        );
        if let Some(after) = page.after_key.filter(|key| !key.is_empty()) {
            self.state = CursorState::Iterating(Some(after));
        }
        Some(Ok(page.buckets.into_iter().map(|bucket| bucket.key).collect()))
    }
}

/// Every distinct combination of `fields` among documents matching
/// `filter`, in the index's ascending bucket order.
///
/// # Errors
///
/// [`QueryError::NoFields`] for an empty field list, the first backend
/// error, or [`QueryError::PageLimitExceeded`] when the index keeps
/// returning cursors beyond `options.max_pages` requests.
pub fn enumerate_distinct_terms<I, S>(
    index: &I,
    fields: &[S],
    filter: &Filter,
    options: &EnumerationOptions,
) -> Result<Vec<TermCombination>>
where
    I: SearchIndex + ?Sized,
    S: AsRef<str>,
{
    let mut pages = TermPages::new(index, fields, filter, *options)?;
    let mut combinations = Vec::new();
    for page in pages.by_ref() {
        combinations.extend(page?);
    }
    info!(
        combinations = combinations.len(),
        requests = pages.requests(),
        "term enumeration complete"
    );
    Ok(combinations)
}
