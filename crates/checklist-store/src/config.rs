//! Service configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Report service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Maximum cached templates
    pub cache_capacity: u64,
    /// Seconds a cached template stays valid
    pub cache_ttl_secs: u64,
    /// Refuse changes to finalized reports until amended; when off, a
    /// change reopens the report as a draft
    pub lock_finalized: bool,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache TTL
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// With finalized-report locking
    #[inline]
    #[must_use]
    pub fn with_lock_finalized(mut self, lock: bool) -> Self {
        self.lock_finalized = lock;
        self
    }

    /// Cache TTL as a duration
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1_000,
            cache_ttl_secs: 300,
            lock_finalized: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.cache_capacity, 1_000);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.lock_finalized);
    }

    #[test]
    fn builder_overrides() {
        let config = ServiceConfig::new()
            .with_cache_capacity(10)
            .with_cache_ttl(Duration::from_secs(5))
            .with_lock_finalized(false);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.cache_ttl_secs, 5);
        assert!(!config.lock_finalized);
    }
}
