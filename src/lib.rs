//! Delta Cache - conditional-GET response caching
//!
//! Serves `304 Not Modified` when a client's `If-None-Match` /
//! `If-Modified-Since` validators match a stored entry, otherwise serves the
//! stored entry or computes, stores and serves a fresh one. Entries live in
//! an in-process store with sliding and absolute expiration.

pub mod api;
pub mod cache;
pub mod conditional;
pub mod config;
pub mod error;
pub mod tasks;
pub mod validation;

pub use cache::{CacheEntry, CachePriority, CacheStats, EntryOptions, ExpiringStore};
pub use conditional::{ConditionalCache, Outcome, ValidatorHeaders};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_compaction_task;
pub use validation::{ConditionalHeaders, EtagStrategy};
