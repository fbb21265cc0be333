//! In-memory ledger store.
//!
//! Implements both store traits over insertion-ordered vectors. Used by tests
//! and by the node when it serves a JSON fixture instead of a database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ledgerview_common::{
    Account, AccountAddress, LedgerError, Result, Transaction, TransactionId,
};

use crate::filter::{AccountFilter, Page, TransactionFilter};
use crate::store::{AccountDirectory, TransactionStore};

/// Serializable snapshot of a ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// In-memory transaction store and account directory.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    transactions: RwLock<Vec<Transaction>>,
    accounts: RwLock<Vec<Account>>,
    available: AtomicBool,
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(Vec::new()),
            accounts: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Build a store from a snapshot, rejecting duplicate account addresses.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self> {
        let store = Self::new();
        for account in snapshot.accounts {
            store.insert_account(account)?;
        }
        for tx in snapshot.transactions {
            store.insert_transaction(tx);
        }
        Ok(store)
    }

    /// Append a transaction at the end of the natural order.
    pub fn insert_transaction(&self, tx: Transaction) {
        self.transactions.write().push(tx);
    }

    /// Add an account. Addresses are unique.
    pub fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| a.addr == account.addr) {
            return Err(LedgerError::DuplicateAccount(account.addr.to_string()));
        }
        accounts.push(account);
        Ok(())
    }

    /// Simulate the backing service going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }

    /// Number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }

    fn collect_where(&self, pred: impl Fn(&Transaction) -> bool) -> Result<Vec<Transaction>> {
        self.ensure_available()?;
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|tx| pred(tx))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionStore for InMemoryLedgerStore {
    async fn search(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>> {
        self.ensure_available()?;
        let transactions = self.transactions.read();
        let found = page.apply(transactions.iter().filter(|tx| filter.matches(tx)).cloned());
        debug!(count = found.len(), skip = page.skip, limit = page.limit, "In-memory search");
        Ok(found)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.ensure_available()?;
        Ok(self.transactions.read().iter().find(|tx| tx.id == id).cloned())
    }

    async fn by_credit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.collect_where(|tx| &tx.credit == addr)
    }

    async fn by_debit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.collect_where(|tx| &tx.debit == addr)
    }
}

#[async_trait]
impl AccountDirectory for InMemoryLedgerStore {
    async fn find_by_addr(&self, addr: &AccountAddress) -> Result<Option<Account>> {
        self.ensure_available()?;
        Ok(self.accounts.read().iter().find(|a| &a.addr == addr).cloned())
    }

    async fn search(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        self.ensure_available()?;
        Ok(self
            .accounts
            .read()
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}
