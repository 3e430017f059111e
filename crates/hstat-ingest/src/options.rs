//! Options controlling how records are handed to downstream writers.

use serde::{Deserialize, Serialize};

/// Default number of records per bulk write.
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Records per bulk write. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Split `items` into bulk-write sized chunks.
pub fn batches<'a, T>(items: &'a [T], options: &IngestOptions) -> std::slice::Chunks<'a, T> {
    items.chunks(options.batch_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_bound_chunk_size() {
        let items: Vec<u32> = (0..7).collect();
        let sizes: Vec<usize> = batches(&items, &IngestOptions::default().with_batch_size(3))
            .map(<[u32]>::len)
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn zero_batch_size_still_progresses() {
        let items = [1, 2];
        let options = IngestOptions::default().with_batch_size(0);
        assert_eq!(batches(&items, &options).count(), 2);
    }
}
