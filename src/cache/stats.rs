//! Cache Statistics Module
//!
//! Counters kept by the bounded engine: hits, misses and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that found their key
    pub hits: u64,
    /// Reads that did not
    pub misses: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Live entries at snapshot time
    pub entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
