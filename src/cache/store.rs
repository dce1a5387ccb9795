//! Cache Store Module
//!
//! Concurrent key-value store with sliding and absolute expiration, a size
//! budget, and priority-aware compaction.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CachePriority, CacheStats, EntryOptions};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Slot ==
/// A stored entry plus the bookkeeping its expiration clocks need.
#[derive(Debug)]
struct Slot<T> {
    entry: Arc<CacheEntry<T>>,
    options: EntryOptions,
    /// Insertion time (Unix milliseconds), start of the absolute clock
    inserted_at: u64,
    /// Last read or insertion (Unix milliseconds), start of the sliding clock
    last_access: AtomicU64,
}

impl<T> Slot<T> {
    fn new(entry: Arc<CacheEntry<T>>, options: EntryOptions, now: u64) -> Self {
        Self {
            entry,
            options,
            inserted_at: now,
            last_access: AtomicU64::new(now),
        }
    }

    /// An entry is expired once `now` reaches either deadline.
    fn is_expired(&self, now: u64) -> bool {
        let absolute = self
            .options
            .absolute_expiration
            .is_some_and(|d| now >= self.inserted_at.saturating_add(duration_ms(d)));
        let sliding = self
            .options
            .sliding_expiration
            .is_some_and(|d| now >= self.last_access().saturating_add(duration_ms(d)));
        absolute || sliding
    }

    fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    fn touch(&self, now: u64) {
        self.last_access.fetch_max(now, Ordering::Relaxed);
    }
}

/// Milliseconds in `d`, saturating for durations past `u64::MAX` ms.
fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// == Expiring Store ==
/// Thread-safe store of immutable entries keyed by string.
///
/// Reads and writes for different keys never wait on each other; the map is
/// sharded and entries are shared as `Arc`s, so a reader only ever sees a
/// fully constructed entry.
#[derive(Debug)]
pub struct ExpiringStore<T> {
    entries: DashMap<String, Slot<T>>,
    /// Sum of `size` over all stored entries
    size: AtomicUsize,
    size_limit: usize,
    compaction_percentage: f64,
    counters: StatsCounters,
}

impl<T> ExpiringStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `size_limit` - Capacity budget in size units
    /// * `compaction_percentage` - Fraction of entries removed per compaction
    pub fn new(size_limit: usize, compaction_percentage: f64) -> Self {
        Self {
            entries: DashMap::new(),
            size: AtomicUsize::new(0),
            size_limit,
            compaction_percentage,
            counters: StatsCounters::default(),
        }
    }

    /// Creates an empty store sized from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.size_limit, config.compaction_percentage)
    }

    // == Get ==
    /// Returns the live entry for `key` and restarts its sliding clock.
    ///
    /// An entry found past either deadline is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry<T>>> {
        let now = current_timestamp_ms();
        let stale = {
            let slot = self.entries.get(key)?;
            if !slot.is_expired(now) {
                slot.touch(now);
                return Some(Arc::clone(&slot.entry));
            }
            Arc::clone(&slot.entry)
        };

        // A concurrent set may have replaced the slot; only drop the one we saw
        if self.remove_where(key, |slot| Arc::ptr_eq(&slot.entry, &stale)) {
            self.counters.record_expirations(1);
        }
        None
    }

    // == Set ==
    /// Stores `entry` under `key`, replacing any previous entry.
    ///
    /// If the write would exceed the size budget one compaction pass runs
    /// first. The write is refused only when the store is still over budget
    /// afterwards, i.e. nothing evictable was left to make room.
    pub fn set(
        &self,
        key: impl Into<String>,
        entry: Arc<CacheEntry<T>>,
        options: &EntryOptions,
    ) -> Result<()> {
        let key = key.into();

        let projected = self.projected_size(&key, options.size);
        if projected > self.size_limit {
            let removed = self.compact(self.compaction_percentage);
            debug!(
                "Store over budget ({} > {}), compaction removed {} entries",
                projected, self.size_limit, removed
            );

            if self.projected_size(&key, options.size) > self.size_limit {
                self.counters.record_rejection();
                return Err(CacheError::CapacityExceeded(key));
            }
        }

        let slot = Slot::new(entry, options.clone(), current_timestamp_ms());
        self.size.fetch_add(options.size, Ordering::AcqRel);
        if let Some(previous) = self.entries.insert(key, slot) {
            self.size.fetch_sub(previous.options.size, Ordering::AcqRel);
        }
        Ok(())
    }

    // == Scan Expired ==
    /// Removes every entry past either deadline.
    ///
    /// Returns the number of entries removed.
    pub fn scan_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|slot| slot.value().is_expired(now))
            .map(|slot| slot.key().clone())
            .collect();

        let removed = expired
            .iter()
            .filter(|key| self.remove_where(key.as_str(), |slot| slot.is_expired(now)))
            .count();

        self.counters.record_expirations(removed);
        removed
    }

    // == Compact ==
    /// Removes at least `ceil(len * percentage)` entries when possible.
    ///
    /// Expired entries go first, then live ones ordered by priority and
    /// least recent access. `NeverRemove` entries are skipped.
    ///
    /// Returns the total number of entries removed.
    pub fn compact(&self, percentage: f64) -> usize {
        let before = self.entries.len();
        let expired = self.scan_expired();
        let target = (before as f64 * percentage).ceil() as usize;
        if expired >= target {
            return expired;
        }

        let mut candidates: Vec<(CachePriority, u64, String)> = self
            .entries
            .iter()
            .filter(|slot| slot.value().options.priority != CachePriority::NeverRemove)
            .map(|slot| {
                let value = slot.value();
                (value.options.priority, value.last_access(), slot.key().clone())
            })
            .collect();
        candidates.sort();

        let evicted = candidates
            .into_iter()
            .take(target - expired)
            .filter(|(_, _, key)| self.remove_where(key, |_| true))
            .count();

        self.counters.record_evictions(evicted);
        expired + evicted
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len(), self.size())
    }

    pub(crate) fn counters(&self) -> &StatsCounters {
        &self.counters
    }

    // == Accessors ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size units currently charged.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    pub fn compaction_percentage(&self) -> f64 {
        self.compaction_percentage
    }

    /// True when the store has no room left for another unit.
    pub fn is_over_budget(&self) -> bool {
        self.size() >= self.size_limit
    }

    /// Size charged after writing `size` units under `key`.
    fn projected_size(&self, key: &str, size: usize) -> usize {
        let replaced = self.entries.get(key).map_or(0, |slot| slot.options.size);
        self.size().saturating_sub(replaced) + size
    }

    fn remove_where(&self, key: &str, predicate: impl FnOnce(&Slot<T>) -> bool) -> bool {
        match self.entries.remove_if(key, |_, slot| predicate(slot)) {
            Some((_, slot)) => {
                self.size.fetch_sub(slot.options.size, Ordering::AcqRel);
                true
            }
            None => false,
        }
    }
}
