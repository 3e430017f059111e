//! Entity-type derivation from `entity.*` fields.

use tracing::debug;

use hstat_model::Record;

use crate::error::TransformError;
use crate::transformer::Transformer;

pub const ENTITY_PREFIX: &str = "entity.";
pub const ENTITY_DISTRICT: &str = "entity.district";
pub const ENTITY_STATE: &str = "entity.state";
pub const ENTITY_TYPE: &str = "entity.type";

pub const DISTRICT: &str = "DISTRICT";
pub const STATE: &str = "STATE";

/// Sets `entity.type` from the most specific administrative level present.
///
/// District wins over state. Records with neither are inspected for a single
/// other `entity.*` field; its suffix is logged as the inferred type but is
/// not written to the record. Several such fields are a conflict.
#[derive(Debug, Clone, Default)]
pub struct EntityTypeTransformer;

impl EntityTypeTransformer {
    pub const NAME: &'static str = "entity-type";

    pub fn new() -> Self {
        Self
    }
}

impl Transformer for EntityTypeTransformer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&mut self, record: &Record) -> Result<Vec<Record>, TransformError> {
        let mut out = record.clone();
        if record.contains(ENTITY_DISTRICT) {
            out.insert(ENTITY_TYPE, DISTRICT);
            return Ok(vec![out]);
        }
        if record.contains(ENTITY_STATE) {
            out.insert(ENTITY_TYPE, STATE);
            return Ok(vec![out]);
        }

        let fields: Vec<&str> = record
            .fields_with_prefix(ENTITY_PREFIX)
            .map(|(field, _)| field)
            .filter(|field| *field != ENTITY_TYPE)
            .collect();
        match fields.as_slice() {
            [] => {}
            [field] => {
                let inferred = field.trim_start_matches(ENTITY_PREFIX).to_uppercase();
                debug!(field = *field, inferred = %inferred, "entity type inferred, not applied");
            }
            _ => {
                return Err(TransformError::ConflictingEntity {
                    fields: fields.iter().map(|field| (*field).to_string()).collect(),
                });
            }
        }
        Ok(vec![out])
    }
}
