//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{CacheError, Result};
use crate::validation::EtagStrategy;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity budget of the store, in size units
    pub size_limit: usize,
    /// Fraction of entries a compaction pass removes when over budget
    pub compaction_percentage: f64,
    /// Background expiration scan interval in seconds
    pub scan_interval: u64,
    /// Sliding expiration in seconds (entry dropped if unread this long)
    pub sliding_expiration: u64,
    /// Absolute expiration in seconds (entry dropped this long after creation)
    pub absolute_expiration: u64,
    /// How ETags are minted for new entries
    pub etag_strategy: EtagStrategy,
    /// Serialize concurrent async misses for the same key
    pub single_flight: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    ///
    /// # Environment Variables
    /// - `DELTA_CACHE_SIZE_LIMIT` - Store capacity in units (default: 1024)
    /// - `DELTA_CACHE_COMPACTION_PERCENTAGE` - Compaction fraction (default: 0.2)
    /// - `DELTA_CACHE_SCAN_INTERVAL` - Expiration scan frequency in seconds (default: 300)
    /// - `DELTA_CACHE_SLIDING_EXPIRATION` - Sliding expiration in seconds (default: 300)
    /// - `DELTA_CACHE_ABSOLUTE_EXPIRATION` - Absolute expiration in seconds (default: 1800)
    /// - `DELTA_CACHE_ETAG_STRATEGY` - `random` or `content-hash` (default: random)
    /// - `DELTA_CACHE_SINGLE_FLIGHT` - `true` or `false` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            size_limit: env_or("DELTA_CACHE_SIZE_LIMIT", defaults.size_limit),
            compaction_percentage: env_or(
                "DELTA_CACHE_COMPACTION_PERCENTAGE",
                defaults.compaction_percentage,
            ),
            scan_interval: env_or("DELTA_CACHE_SCAN_INTERVAL", defaults.scan_interval),
            sliding_expiration: env_or(
                "DELTA_CACHE_SLIDING_EXPIRATION",
                defaults.sliding_expiration,
            ),
            absolute_expiration: env_or(
                "DELTA_CACHE_ABSOLUTE_EXPIRATION",
                defaults.absolute_expiration,
            ),
            etag_strategy: env_or("DELTA_CACHE_ETAG_STRATEGY", defaults.etag_strategy),
            single_flight: env_or("DELTA_CACHE_SINGLE_FLIGHT", defaults.single_flight),
        }
    }

    /// Checks that every value is usable by the store.
    pub fn validate(&self) -> Result<()> {
        if self.size_limit == 0 {
            return Err(CacheError::InvalidConfig(
                "size_limit must be greater than zero".to_string(),
            ));
        }
        if !(self.compaction_percentage > 0.0 && self.compaction_percentage <= 1.0) {
            return Err(CacheError::InvalidConfig(format!(
                "compaction_percentage must be in (0, 1], got {}",
                self.compaction_percentage
            )));
        }
        if self.scan_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "scan_interval must be greater than zero".to_string(),
            ));
        }
        // A zero window expires every entry on arrival
        if self.sliding_expiration == 0 {
            return Err(CacheError::InvalidConfig(
                "sliding_expiration must be greater than zero".to_string(),
            ));
        }
        if self.absolute_expiration == 0 {
            return Err(CacheError::InvalidConfig(
                "absolute_expiration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size_limit: 1024,
            compaction_percentage: 0.2,
            scan_interval: 300,
            sliding_expiration: 300,
            absolute_expiration: 1800,
            etag_strategy: EtagStrategy::Random,
            single_flight: false,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
