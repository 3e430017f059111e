//! Named transformer construction.
//!
//! `date` and `entity-type` are built in. Every other name refers to a rule
//! file `<rules_dir>/<name>.csv` and becomes a [`RuleLookupTransformer`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::chain::TransformChain;
use crate::date::DateTransformer;
use crate::entity::EntityTypeTransformer;
use crate::error::RuleLoadError;
use crate::lookup::RuleLookupTransformer;
use crate::rule_table::RuleTable;
use crate::transformer::Transformer;

pub const DATE_TRANSFORMER: &str = DateTransformer::NAME;
pub const ENTITY_TYPE_TRANSFORMER: &str = EntityTypeTransformer::NAME;

const RULE_FILE_EXTENSION: &str = "csv";

#[derive(Debug, Clone)]
pub struct TransformerRegistry {
    rules_dir: PathBuf,
}

impl TransformerRegistry {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
        }
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Rule file backing a lookup transformer called `name`.
    pub fn rule_path(&self, name: &str) -> Result<PathBuf, RuleLoadError> {
        validate_name(name)?;
        Ok(self.rules_dir.join(format!("{name}.{RULE_FILE_EXTENSION}")))
    }

    /// Build one transformer by name.
    pub fn build(&self, name: &str) -> Result<Box<dyn Transformer>, RuleLoadError> {
        match name {
            DATE_TRANSFORMER => Ok(Box::new(DateTransformer::new())),
            ENTITY_TYPE_TRANSFORMER => Ok(Box::new(EntityTypeTransformer::new())),
            _ => {
                let path = self.rule_path(name)?;
                let table = RuleTable::from_path(&path)?;
                debug!(transformer = name, path = %path.display(), "lookup transformer built");
                Ok(Box::new(RuleLookupTransformer::new(name, table)))
            }
        }
    }

    /// Build a chain in the given order. The first failure aborts the build.
    pub fn build_chain<I, S>(&self, names: I) -> Result<TransformChain, RuleLoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chain = TransformChain::new();
        for name in names {
            chain.push(self.build(name.as_ref())?);
        }
        info!(transformers = ?chain.names(), "transform chain ready");
        Ok(chain)
    }
}

fn validate_name(name: &str) -> Result<(), RuleLoadError> {
    let invalid = name.trim().is_empty()
        || name != name.trim()
        || name.contains(['/', '\\'])
        || name == "."
        || name == "..";
    if invalid {
        return Err(RuleLoadError::InvalidTransformerName {
            name: name.to_string(),
        });
    }
    Ok(())
}
