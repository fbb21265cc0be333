//! Node configuration.

use std::path::PathBuf;

use ledgerview_ledger::{CacheConfig, QueryConfig};

/// Where the node reads the ledger from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// JSON snapshot loaded into memory.
    Fixture(PathBuf),
    /// PostgreSQL database.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

/// Main node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Database URL.
    pub database_url: Option<String>,
    /// JSON fixture path.
    pub fixture_path: Option<PathBuf>,
    /// Maximum pooled database connections.
    pub max_connections: u32,
    /// Wrap the transaction store in a read-through cache.
    pub cache_enabled: bool,
    /// Cache configuration.
    pub cache_config: CacheConfig,
    /// Query configuration.
    pub query_config: QueryConfig,
    /// Log level.
    pub log_level: String,
    /// Emit logs as JSON.
    pub log_json: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            fixture_path: None,
            max_connections: 5,
            cache_enabled: false,
            cache_config: CacheConfig::default(),
            query_config: QueryConfig::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

fn env_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl NodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            query_config: QueryConfig::from_env(),
            ..Self::default()
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = Some(url);
        }

        if let Ok(path) = std::env::var("LEDGERVIEW_FIXTURE") {
            config.fixture_path = Some(PathBuf::from(path));
        }

        if let Ok(max) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.max_connections = max;
            }
        }

        if let Ok(cache) = std::env::var("LEDGERVIEW_CACHE") {
            config.cache_enabled = env_flag(&cache);
        }

        if let Ok(ttl) = std::env::var("LEDGERVIEW_CACHE_TTL_MS") {
            if let Ok(ttl) = ttl.parse() {
                config.cache_config.ttl = chrono::Duration::milliseconds(ttl);
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.log_json = format.eq_ignore_ascii_case("json");
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.fixture_path, &self.database_url) {
            (None, None) => {
                return Err("Either a fixture path or a database URL is required".to_string())
            }
            (Some(_), Some(_)) => {
                return Err("Fixture path and database URL are mutually exclusive".to_string())
            }
            _ => {}
        }

        if self.database_url.as_deref() == Some("") {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("Max connections cannot be 0".to_string());
        }

        if self.cache_config.ttl <= chrono::Duration::zero() {
            return Err("Cache TTL must be positive".to_string());
        }

        self.query_config.validate()
    }

    /// The configured backend. Call after [`validate`](Self::validate).
    pub fn backend(&self) -> Result<BackendConfig, String> {
        self.validate()?;
        match (&self.fixture_path, &self.database_url) {
            (Some(path), _) => Ok(BackendConfig::Fixture(path.clone())),
            (None, Some(url)) => Ok(BackendConfig::Postgres {
                database_url: url.clone(),
                max_connections: self.max_connections,
            }),
            (None, None) => Err("No backend configured".to_string()),
        }
    }
}
