//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is alive.
//!
//! # Tasks
//! - Compaction: sweeps expired entries and compacts an over-budget store

mod compaction;

pub use compaction::spawn_compaction_task;
