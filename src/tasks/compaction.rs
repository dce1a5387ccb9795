//! Compaction Task
//!
//! Background task that periodically removes expired entries and compacts
//! the store when it has reached its size budget.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ExpiringStore;

/// Spawns a background task that sweeps `store` every `interval`.
///
/// Each pass removes expired entries; if the store is still at or over its
/// budget, it runs a compaction with the store's configured percentage.
/// No lock is held across passes, and within a pass entries are removed one
/// key at a time.
///
/// # Returns
/// A JoinHandle for the spawned task, which the owner aborts at teardown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(ExpiringStore::<Vec<Game>>::new(1024, 0.2));
/// let handle = spawn_compaction_task(store.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_compaction_task<T>(store: Arc<ExpiringStore<T>>, interval: Duration) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting compaction task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let expired = store.scan_expired();
            let compacted = if store.is_over_budget() {
                store.compact(store.compaction_percentage())
            } else {
                0
            };

            if expired + compacted > 0 {
                info!(
                    "Compaction: removed {} expired and {} further entries",
                    expired, compacted
                );
            } else {
                debug!("Compaction: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, EntryOptions};
    use crate::validation::EtagStrategy;

    fn entry(value: &str) -> Arc<CacheEntry<String>> {
        Arc::new(CacheEntry::new(value.to_string(), EtagStrategy::Random))
    }

    #[tokio::test]
    async fn test_task_removes_expired_entries() {
        let store = Arc::new(ExpiringStore::new(100, 0.2));
        let options = EntryOptions::new().absolute(Duration::from_millis(50));
        store.set("expire_soon", entry("value"), &options).unwrap();

        let handle = spawn_compaction_task(store.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;

        // Removed by the sweep, not by a lazy read
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_task_preserves_live_entries() {
        let store = Arc::new(ExpiringStore::new(100, 0.2));
        let options = EntryOptions::new().absolute(Duration::from_secs(3600));
        store.set("long_lived", entry("value"), &options).unwrap();

        let handle = spawn_compaction_task(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.get("long_lived").unwrap().data(), "value");

        handle.abort();
    }

    #[tokio::test]
    async fn test_task_compacts_full_store() {
        let store = Arc::new(ExpiringStore::new(5, 0.4));
        for i in 0..5 {
            store
                .set(format!("key{}", i), entry("value"), &EntryOptions::new())
                .unwrap();
        }
        assert!(store.is_over_budget());

        let handle = spawn_compaction_task(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(120)).await;

        // ceil(5 * 0.4) = 2 per pass; one pass leaves the store under budget
        assert_eq!(store.len(), 3);
        assert!(!store.is_over_budget());

        handle.abort();
    }

    #[tokio::test]
    async fn test_task_can_be_aborted() {
        let store: Arc<ExpiringStore<String>> = Arc::new(ExpiringStore::new(100, 0.2));

        let handle = spawn_compaction_task(store, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
