//! Error types for the conditional cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
///
/// A refused write never reaches an HTTP client; it degrades to a recompute
/// on the next request. Configuration errors surface at construction time.
/// Only `FillCancelled` is handed to callers of the async fill.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Store refused the entry because its size budget is exhausted
    #[error("Cache full, entry not stored: {0}")]
    CapacityExceeded(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Async fill task was cancelled before it produced an entry
    #[error("Fill cancelled before completion: {0}")]
    FillCancelled(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
