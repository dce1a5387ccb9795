//! Entry Options Module
//!
//! Per-entry expiration clocks, eviction priority and size cost.

use std::time::Duration;

use crate::config::Config;

// == Cache Priority ==
/// Eviction hint used by compaction; lower priorities go first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CachePriority {
    Low,
    #[default]
    Normal,
    High,
    /// Never removed by compaction, only by expiration
    NeverRemove,
}

// == Entry Options ==
/// Options applied when an entry is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOptions {
    /// Evict if unread for this long
    pub sliding_expiration: Option<Duration>,
    /// Evict this long after insertion, regardless of reads
    pub absolute_expiration: Option<Duration>,
    /// Compaction hint
    pub priority: CachePriority,
    /// Units charged against the store's size budget
    pub size: usize,
}

impl EntryOptions {
    /// Options with no expiration, normal priority and unit size.
    pub fn new() -> Self {
        Self {
            sliding_expiration: None,
            absolute_expiration: None,
            priority: CachePriority::Normal,
            size: 1,
        }
    }

    /// The options every conditional-cache entry is stored with.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .sliding(Duration::from_secs(config.sliding_expiration))
            .absolute(Duration::from_secs(config.absolute_expiration))
            .priority(CachePriority::High)
    }

    pub fn sliding(mut self, duration: Duration) -> Self {
        self.sliding_expiration = Some(duration);
        self
    }

    pub fn absolute(mut self, duration: Duration) -> Self {
        self.absolute_expiration = Some(duration);
        self
    }

    pub fn priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = EntryOptions::default();
        assert_eq!(options.sliding_expiration, Some(Duration::from_secs(5 * 60)));
        assert_eq!(options.absolute_expiration, Some(Duration::from_secs(30 * 60)));
        assert_eq!(options.priority, CachePriority::High);
        assert_eq!(options.size, 1);
    }

    #[test]
    fn test_priority_order() {
        assert!(CachePriority::Low < CachePriority::Normal);
        assert!(CachePriority::Normal < CachePriority::High);
        assert!(CachePriority::High < CachePriority::NeverRemove);
    }

    #[test]
    fn test_builder() {
        let options = EntryOptions::new()
            .sliding(Duration::from_millis(50))
            .priority(CachePriority::Low)
            .size(3);

        assert_eq!(options.sliding_expiration, Some(Duration::from_millis(50)));
        assert_eq!(options.absolute_expiration, None);
        assert_eq!(options.priority, CachePriority::Low);
        assert_eq!(options.size, 3);
    }
}
