//! Bookkeeping for lookup keys that matched no rule.

use std::collections::HashMap;

use hstat_model::{LookupKey, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedEntry {
    pub key: LookupKey,
    /// The first record that produced this key.
    pub record: Record,
    pub occurrences: usize,
}

/// Insertion-ordered set of unmatched keys. A key is stored once; repeat
/// sightings only bump its occurrence count.
#[derive(Debug, Clone, Default)]
pub struct UnmatchedRegistry {
    entries: Vec<UnmatchedEntry>,
    positions: HashMap<LookupKey, usize>,
}

impl UnmatchedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed key. Returns `true` the first time `key` is seen.
    pub fn register(&mut self, key: LookupKey, record: &Record) -> bool {
        if let Some(&position) = self.positions.get(&key) {
            self.entries[position].occurrences += 1;
            return false;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push(UnmatchedEntry {
            key,
            record: record.clone(),
            occurrences: 1,
        });
        true
    }

    pub fn contains(&self, key: &LookupKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[UnmatchedEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &LookupKey> {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
