//! Rule-driven record transformation for health-statistics datasets.
//!
//! - **rule_table**: lookup tables loaded from `match `-headed CSV rule files
//! - **lookup**: the rule lookup transformer and its unmatched-key bookkeeping
//! - **date** / **entity**: heuristic normalizers for durations and entity types
//! - **chain**: ordered execution of transformers over a batch
//! - **registry**: building chains from transformer names
//! - **report**: CSV reports of unresolved lookup keys

pub mod chain;
pub mod date;
pub mod entity;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod report;
pub mod rule_table;
pub mod transformer;
pub mod unmatched;

pub use chain::{ChainOutcome, RejectedRecord, StageStats, TransformChain, apply_transforms};
pub use date::{DateTransformer, DurationType, classify_duration, normalize_date};
pub use entity::EntityTypeTransformer;
pub use error::{ReportError, RuleLoadError, TransformError};
pub use lookup::RuleLookupTransformer;
pub use registry::{DATE_TRANSFORMER, ENTITY_TYPE_TRANSFORMER, TransformerRegistry};
pub use report::{FailureReport, OCCURRENCES_COLUMN};
pub use rule_table::{MATCH_PREFIX, RuleRow, RuleTable};
pub use transformer::Transformer;
pub use unmatched::{UnmatchedEntry, UnmatchedRegistry};
