//! Conditional Cache
//!
//! `get_or_set` decides between 304, a stored entry, and a fresh fill:
//!
//! 1. Look up the key in the store.
//! 2. On a live entry: `If-None-Match` equal to its ETag, or else an
//!    `If-Modified-Since` at or after its `Last-Modified`, answers
//!    [`Outcome::NotModified`]; otherwise [`Outcome::Hit`].
//! 3. On no live entry: compute, wrap with fresh validators, store, and
//!    answer [`Outcome::Miss`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::flight::InFlight;
use super::Outcome;
use crate::cache::{CacheEntry, CacheStats, EntryOptions, ExpiringStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_compaction_task;
use crate::validation::{ConditionalHeaders, EtagStrategy};

// == Conditional Cache ==
/// Conditional-GET cache for payloads of type `T`.
///
/// Cloning is cheap and every clone shares the same store, so one instance
/// built at startup can be handed to every request handler.
#[derive(Debug)]
pub struct ConditionalCache<T> {
    store: Arc<ExpiringStore<T>>,
    entry_options: EntryOptions,
    etag_strategy: EtagStrategy,
    /// Period of the background compaction task
    scan_interval: Duration,
    /// Present only when single-flight fills are enabled
    flights: Option<InFlight>,
}

/// Scan interval used when a store is wrapped without configuration.
const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(300);

impl<T> Clone for ConditionalCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entry_options: self.entry_options.clone(),
            etag_strategy: self.etag_strategy,
            scan_interval: self.scan_interval,
            flights: self.flights.clone(),
        }
    }
}

impl<T> ConditionalCache<T> {
    // == Constructors ==
    /// Builds a cache and its store from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(ExpiringStore::from_config(config));
        Ok(Self::with_store(store, EntryOptions::from_config(config), config.etag_strategy)
            .with_scan_interval(Duration::from_secs(config.scan_interval))
            .with_single_flight(config.single_flight))
    }

    /// Wraps an existing store.
    pub fn with_store(
        store: Arc<ExpiringStore<T>>,
        entry_options: EntryOptions,
        etag_strategy: EtagStrategy,
    ) -> Self {
        Self {
            store,
            entry_options,
            etag_strategy,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            flights: None,
        }
    }

    /// Replaces the background compaction period.
    pub fn with_scan_interval(mut self, scan_interval: Duration) -> Self {
        self.scan_interval = scan_interval;
        self
    }

    /// Replaces the options new entries are stored with.
    pub fn with_entry_options(mut self, entry_options: EntryOptions) -> Self {
        self.entry_options = entry_options;
        self
    }

    /// Enables or disables single-flight fills in [`get_or_set_async`].
    ///
    /// [`get_or_set_async`]: ConditionalCache::get_or_set_async
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(InFlight::default);
        self
    }

    // == Accessors ==
    pub fn store(&self) -> &Arc<ExpiringStore<T>> {
        &self.store
    }

    pub fn entry_options(&self) -> &EntryOptions {
        &self.entry_options
    }

    pub fn etag_strategy(&self) -> EtagStrategy {
        self.etag_strategy
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Keys with a single-flight fill running or queued.
    pub fn pending_fills(&self) -> usize {
        self.flights.as_ref().map_or(0, InFlight::len)
    }

    // == Lookup ==
    /// Steps 1 and 2: answers from a live entry, or `None` on a miss.
    fn lookup(&self, key: &str, headers: &ConditionalHeaders) -> Option<Outcome<T>> {
        let entry = self.store.get(key)?;
        let counters = self.store.counters();

        if headers.etag_matches(entry.etag()) {
            counters.record_not_modified();
            debug!("'{}': If-None-Match matched {}, not modified", key, entry.etag());
            return Some(Outcome::NotModified);
        }

        if headers.unmodified_since(entry.last_modified()) {
            counters.record_not_modified();
            debug!("'{}': unchanged since If-Modified-Since, not modified", key);
            return Some(Outcome::NotModified);
        }

        counters.record_hit();
        debug!("'{}': cache hit, serving {}", key, entry.etag());
        Some(Outcome::Hit(entry))
    }
}

impl<T: Serialize> ConditionalCache<T> {
    // == Get Or Set ==
    /// Answers a conditional request for `key`, calling `compute` only when
    /// the store holds no live entry.
    ///
    /// An error from `compute` is returned unchanged and nothing is stored.
    /// Concurrent misses for the same key each compute; the last write wins.
    pub fn get_or_set<F, E>(
        &self,
        key: &str,
        headers: &ConditionalHeaders,
        compute: F,
    ) -> std::result::Result<Outcome<T>, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        if let Some(outcome) = self.lookup(key, headers) {
            return Ok(outcome);
        }

        self.store.counters().record_miss();
        let data = compute()?;
        Ok(Outcome::Miss(fill(
            &self.store,
            key,
            data,
            self.etag_strategy,
            &self.entry_options,
        )))
    }
}

impl<T> ConditionalCache<T>
where
    T: Serialize + Send + Sync + 'static,
{
    // == Get Or Set (async) ==
    /// Async form of [`get_or_set`] for producers that await I/O.
    ///
    /// The producer future and the store write run on a spawned task, so a
    /// caller that gives up (e.g. a timed out request) does not cancel the
    /// fill. With single-flight enabled, concurrent misses for one key wait
    /// for the first fill and are then answered from the store.
    ///
    /// If the fill task is cancelled before finishing (its runtime shut
    /// down), the caller gets [`CacheError::FillCancelled`] converted into `E`.
    ///
    /// [`get_or_set`]: ConditionalCache::get_or_set
    pub async fn get_or_set_async<F, Fut, E>(
        &self,
        key: &str,
        headers: &ConditionalHeaders,
        compute: F,
    ) -> std::result::Result<Outcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: From<CacheError> + Send + 'static,
    {
        if let Some(outcome) = self.lookup(key, headers) {
            return Ok(outcome);
        }

        let flight = match &self.flights {
            Some(flights) => {
                let guard = flights.acquire(key).await;
                // Filled by the caller we waited on
                if let Some(outcome) = self.lookup(key, headers) {
                    return Ok(outcome);
                }
                Some(guard)
            }
            None => None,
        };

        self.store.counters().record_miss();
        let store = Arc::clone(&self.store);
        let options = self.entry_options.clone();
        let strategy = self.etag_strategy;
        let owned_key = key.to_string();
        let pending = compute();

        let task = tokio::spawn(async move {
            let _flight = flight;
            let data = pending.await?;
            Ok::<_, E>(fill(&store, &owned_key, data, strategy, &options))
        });

        match task.await {
            Ok(result) => result.map(Outcome::Miss),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                warn!("'{}': fill task cancelled: {}", key, err);
                Err(CacheError::FillCancelled(key.to_string()).into())
            }
        }
    }

    /// Starts the background expiration scan for this cache's store.
    ///
    /// The owner aborts the returned handle at teardown.
    pub fn spawn_compaction(&self) -> JoinHandle<()> {
        spawn_compaction_task(Arc::clone(&self.store), self.scan_interval)
    }
}

/// Step 3: wraps `data` in a new entry and stores it.
///
/// A refused write is logged and the entry is still returned; the next
/// request for `key` simply misses again.
fn fill<T: Serialize>(
    store: &ExpiringStore<T>,
    key: &str,
    data: T,
    strategy: EtagStrategy,
    options: &EntryOptions,
) -> Arc<CacheEntry<T>> {
    let entry = Arc::new(CacheEntry::new(data, strategy));
    match store.set(key, Arc::clone(&entry), options) {
        Ok(()) => debug!("'{}': cache miss, stored {}", key, entry.etag()),
        Err(err) => warn!("'{}': serving uncached response: {}", key, err),
    }
    entry
}
