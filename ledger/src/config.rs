//! Engine configuration.

use std::time::Duration;

use crate::filter::DEFAULT_LIMIT;

/// Query configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Page size used when a search does not specify one.
    pub default_limit: u32,
    /// Upper bound on any page size.
    pub max_limit: u32,
    /// Deadline applied to operations whose context carries none.
    pub query_timeout: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: 1000,
            query_timeout: None,
        }
    }
}

impl QueryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("LEDGERVIEW_DEFAULT_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.default_limit = limit;
            }
        }

        if let Ok(limit) = std::env::var("LEDGERVIEW_MAX_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.max_limit = limit;
            }
        }

        if let Ok(ms) = std::env::var("LEDGERVIEW_QUERY_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.query_timeout = Some(Duration::from_millis(ms));
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_limit == 0 {
            return Err("Max limit cannot be 0".to_string());
        }

        if self.default_limit > self.max_limit {
            return Err("Default limit cannot exceed max limit".to_string());
        }

        if let Some(timeout) = self.query_timeout {
            if timeout.is_zero() {
                return Err("Query timeout cannot be zero".to_string());
            }
        }

        Ok(())
    }
}

/// Read-through cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached lookup stays valid.
    pub ttl: chrono::Duration,
    /// Maximum number of cached lookups.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::seconds(5),
            max_entries: 10_000,
        }
    }
}
