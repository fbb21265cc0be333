//! Read-through cache for per-address transaction lookups.
//!
//! [`CachedTransactionStore`] wraps any [`TransactionStore`] and implements the
//! same trait, so it slots in wherever a store is injected. Only the
//! credit/debit side lookups are cached; searches and id lookups pass through.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use ledgerview_common::{AccountAddress, Result, Transaction, TransactionId};

use crate::config::CacheConfig;
use crate::filter::{Page, TransactionFilter};
use crate::store::TransactionStore;

/// Which side of a transaction a cached lookup was keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Credit,
    Debit,
}

/// Cached lookup result.
#[derive(Debug, Clone)]
struct CacheEntry {
    transactions: Arc<Vec<Transaction>>,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(transactions: Vec<Transaction>, ttl: Duration) -> Self {
        Self {
            transactions: Arc::new(transactions),
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Utc::now().signed_duration_since(self.cached_at) < self.ttl
    }
}

/// Transaction store decorator with a TTL-bounded, address-keyed cache.
pub struct CachedTransactionStore<S> {
    inner: S,
    cache: DashMap<(Side, AccountAddress), CacheEntry>,
    config: CacheConfig,
}

impl<S: TransactionStore> CachedTransactionStore<S> {
    /// Wrap a store with the default cache configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap a store with a custom cache configuration.
    pub fn with_config(inner: S, config: CacheConfig) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            config,
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop both cached sides for an address, e.g. after a new transaction
    /// touching it has been observed.
    pub fn invalidate(&self, addr: &AccountAddress) {
        self.cache.remove(&(Side::Credit, addr.clone()));
        self.cache.remove(&(Side::Debit, addr.clone()));
        debug!(address = %addr, "Cache invalidated");
    }

    /// Clear all cached lookups.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    fn cached(&self, side: Side, addr: &AccountAddress) -> Option<Vec<Transaction>> {
        let key = (side, addr.clone());

        if let Some(entry) = self.cache.get(&key) {
            if entry.is_valid() {
                debug!(address = %addr, side = ?side, "Cache hit");
                return Some(entry.transactions.as_ref().clone());
            }
            debug!(address = %addr, side = ?side, "Cache entry expired");
            drop(entry);
            self.cache.remove(&key);
        }

        debug!(address = %addr, side = ?side, "Cache miss");
        None
    }

    fn store(&self, side: Side, addr: &AccountAddress, transactions: Vec<Transaction>) {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();
        }
        // Still full of live entries; this lookup stays uncached.
        if self.cache.len() >= self.config.max_entries {
            return;
        }
        self.cache
            .insert((side, addr.clone()), CacheEntry::new(transactions, self.config.ttl));
    }

    async fn read_through(&self, side: Side, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        if let Some(hit) = self.cached(side, addr) {
            return Ok(hit);
        }

        let fetched = match side {
            Side::Credit => self.inner.by_credit(addr).await?,
            Side::Debit => self.inner.by_debit(addr).await?,
        };
        self.store(side, addr, fetched.clone());
        Ok(fetched)
    }
}

#[async_trait]
impl<S: TransactionStore> TransactionStore for CachedTransactionStore<S> {
    async fn search(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>> {
        self.inner.search(filter, page).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.inner.get(id).await
    }

    async fn by_credit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.read_through(Side::Credit, addr).await
    }

    async fn by_debit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.read_through(Side::Debit, addr).await
    }
}
