//! Shared data model for the health-statistics pipeline.
//!
//! - **record**: a single dataset row as a field → value mapping
//! - **lookup**: normalized lookup keys used by rule tables
//! - **filter**: terms/ranges filter specification for the query layer

pub mod error;
pub mod filter;
pub mod lookup;
pub mod record;

pub use error::{ModelError, Result};
pub use filter::{Filter, RangeBounds};
pub use lookup::{LookupKey, normalize_key_value};
pub use record::{ORIGINAL_PREFIX, Record, original_field};
