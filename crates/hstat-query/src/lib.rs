//! Query layer for the health-statistics index.
//!
//! - **compiler**: [`Filter`](hstat_model::Filter) to bool query compilation
//! - **index**: the [`SearchIndex`] client trait and composite aggregation types
//! - **cursor**: cursor-paginated enumeration of distinct term combinations
//! - **memory**: an in-memory index backend

pub mod compiler;
pub mod cursor;
pub mod error;
pub mod index;
pub mod memory;

pub use compiler::{BoolQuery, Query, compile_filter};
pub use cursor::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, EnumerationOptions, TermPages, enumerate_distinct_terms,
};
pub use error::{QueryError, Result};
pub use index::{AfterKey, Bucket, CompositePage, CompositeRequest, SearchIndex, TermCombination};
pub use memory::MemoryIndex;
