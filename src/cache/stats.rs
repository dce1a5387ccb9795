//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, conditional answers,
//! expirations, evictions and refused writes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entry served with a body (validators did not match)
    pub hits: u64,
    /// No live entry; payload computed
    pub misses: u64,
    /// Live entry whose validators matched (304)
    pub not_modified: u64,
    /// Entries dropped because a clock ran out
    pub expirations: u64,
    /// Live entries removed by compaction
    pub evictions: u64,
    /// Writes refused for lack of capacity
    pub rejections: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Current size units charged against the budget
    pub total_size: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Fraction of lookups that found a live entry.
    ///
    /// Returns (hits + not_modified) / (hits + not_modified + misses), or 0.0
    /// if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let found = self.hits + self.not_modified;
        let total = found + self.misses;
        if total == 0 {
            0.0
        } else {
            found as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// Lock-free counters shared by the store and the conditional layer.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    not_modified: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
    rejections: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_modified(&self) {
        self.not_modified.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter into a snapshot.
    pub(crate) fn snapshot(&self, total_entries: usize, total_size: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            not_modified: self.not_modified.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            total_entries,
            total_size,
        }
    }
}
