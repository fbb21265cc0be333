//! LedgerView Ledger Engine
//!
//! Read-side derivations over an existing transaction ledger.
//!
//! # Features
//!
//! - Filtered, paginated transaction search with optional exact-match criteria
//! - Signed net balances with arbitrary-precision decimal accumulation
//! - Counterparty discovery, raw (per transaction) or deduplicated
//! - Per-call deadlines and cancellation at every store boundary
//! - Injectable stores: in-memory, PostgreSQL, and a read-through cache
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ledgerview_ledger::{InMemoryLedgerStore, LedgerEngine, QueryConfig, QueryContext};
//!
//! let store = Arc::new(InMemoryLedgerStore::new());
//! let engine = LedgerEngine::over(store, QueryConfig::default());
//!
//! let balance = engine.balance(&QueryContext::background(), &"A".into()).await?;
//! ```

pub mod balance;
pub mod cache;
pub mod config;
pub mod context;
pub mod counterparty;
pub mod engine;
pub mod filter;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod query;
pub mod store;

pub use balance::{BalanceBreakdown, BalanceCalculator};
pub use cache::CachedTransactionStore;
pub use config::{CacheConfig, QueryConfig};
pub use context::{CancellationHandle, QueryContext};
pub use counterparty::CounterpartyResolver;
pub use engine::LedgerEngine;
pub use filter::{AccountFilter, Page, TransactionFilter, DEFAULT_LIMIT};
pub use memory::{InMemoryLedgerStore, LedgerSnapshot};
#[cfg(feature = "postgres")]
pub use postgres::PgLedgerStore;
pub use query::QueryEngine;
pub use store::{AccountDirectory, SharedAccountDirectory, SharedTransactionStore, TransactionStore};

pub use ledgerview_common::{
    Account, AccountAddress, LedgerError, Result, Transaction, TransactionId,
};
