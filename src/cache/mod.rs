//! Cache Module
//!
//! Expiring in-memory store of immutable entries with sliding and absolute
//! expiration, a size budget, and compaction.

mod entry;
mod options;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use options::{CachePriority, EntryOptions};
pub use stats::CacheStats;
pub use store::ExpiringStore;
