//! Per-key in-flight tracking for single-flight fills.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type FlightMap = DashMap<String, Arc<Mutex<()>>>;

/// Registry of keys currently being computed.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    flights: Arc<FlightMap>,
}

impl InFlight {
    /// Waits until no other caller is filling `key`, then claims it.
    pub(crate) async fn acquire(&self, key: &str) -> FlightGuard {
        let lock = Arc::clone(self.flights.entry(key.to_string()).or_default().value());
        let guard = lock.lock_owned().await;
        FlightGuard {
            flights: Arc::clone(&self.flights),
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a fill running or queued.
    pub(crate) fn len(&self) -> usize {
        self.flights.len()
    }
}

/// Held for the duration of one fill; releases the key on drop.
#[derive(Debug)]
pub(crate) struct FlightGuard {
    flights: Arc<FlightMap>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold their own clone, so only the last one out removes the lock
        self.flights
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
