//! Cache Entry Module
//!
//! Defines an immutable cached payload together with its HTTP validators.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::validation::{format_http_date, EtagStrategy};

// == Cache Entry ==
/// A cached payload and the validators minted when it was constructed.
///
/// Validators are assigned once in the constructor and never change; a new
/// payload under the same key needs a new entry.
#[derive(Debug)]
pub struct CacheEntry<T> {
    data: T,
    etag: String,
    last_modified: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Wraps `data`, minting an ETag with `strategy` and stamping the
    /// current time as `Last-Modified`.
    pub fn new(data: T, strategy: EtagStrategy) -> Self
    where
        T: Serialize,
    {
        let etag = strategy.mint(&data);
        Self {
            data,
            etag,
            last_modified: Utc::now(),
        }
    }

    /// The cached payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The entry's ETag, quoted.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// When the entry was constructed.
    pub fn last_modified(&self) -> &DateTime<Utc> {
        &self.last_modified
    }

    /// `last_modified` as an HTTP date.
    pub fn last_modified_http(&self) -> String {
        format_http_date(&self.last_modified)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as zero.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
