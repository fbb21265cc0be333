//! Builds a ledger engine from node configuration.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use ledgerview_common::{LedgerError, Result};
use ledgerview_ledger::{
    CachedTransactionStore, InMemoryLedgerStore, LedgerEngine, LedgerSnapshot, PgLedgerStore,
    SharedAccountDirectory, SharedTransactionStore,
};

use crate::config::{BackendConfig, NodeConfig};

/// Load a JSON snapshot into an in-memory store.
pub async fn load_fixture(path: &Path) -> Result<InMemoryLedgerStore> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        LedgerError::ConfigurationError(format!("cannot read fixture {}: {e}", path.display()))
    })?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&raw).map_err(|e| {
        LedgerError::ConfigurationError(format!("invalid fixture {}: {e}", path.display()))
    })?;

    let store = InMemoryLedgerStore::from_snapshot(snapshot)?;
    info!(
        path = %path.display(),
        accounts = store.account_count(),
        transactions = store.transaction_count(),
        "Fixture loaded"
    );
    Ok(store)
}

/// Connect to the configured PostgreSQL database.
pub async fn connect_postgres(config: &NodeConfig) -> Result<PgLedgerStore> {
    match config.backend().map_err(LedgerError::ConfigurationError)? {
        BackendConfig::Postgres {
            database_url,
            max_connections,
        } => PgLedgerStore::connect(&database_url, max_connections).await,
        BackendConfig::Fixture(_) => Err(LedgerError::ConfigurationError(
            "a database URL is required".to_string(),
        )),
    }
}

/// Build the engine for the configured backend.
pub async fn build_engine(config: &NodeConfig) -> Result<LedgerEngine> {
    let (transactions, accounts): (SharedTransactionStore, SharedAccountDirectory) =
        match config.backend().map_err(LedgerError::ConfigurationError)? {
            BackendConfig::Fixture(path) => {
                let store = Arc::new(load_fixture(&path).await?);
                (store.clone(), store)
            }
            BackendConfig::Postgres { .. } => {
                let store = Arc::new(connect_postgres(config).await?);
                (store.clone(), store)
            }
        };

    let transactions: SharedTransactionStore = if config.cache_enabled {
        info!(
            ttl_ms = config.cache_config.ttl.num_milliseconds(),
            max_entries = config.cache_config.max_entries,
            "Read-through cache enabled"
        );
        Arc::new(CachedTransactionStore::with_config(
            transactions,
            config.cache_config.clone(),
        ))
    } else {
        transactions
    };

    Ok(LedgerEngine::new(
        transactions,
        accounts,
        config.query_config.clone(),
    ))
}
