//! Read-only capabilities the engine needs from its collaborators.
//!
//! Components receive these as `Arc<dyn ...>` at construction. Nothing in the
//! engine holds a process-wide store handle.

use std::sync::Arc;

use async_trait::async_trait;

use ledgerview_common::{Account, AccountAddress, Result, Transaction, TransactionId};

use crate::filter::{AccountFilter, Page, TransactionFilter};

/// Durable, queryable collection of transaction records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Search with a predicate, returning one page in the store's natural order.
    async fn search(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>>;

    /// Exact-match lookup by identifier.
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Every transaction whose `credit` side is `addr`, in natural order.
    async fn by_credit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>>;

    /// Every transaction whose `debit` side is `addr`, in natural order.
    async fn by_debit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>>;
}

/// Durable collection of account profiles keyed by address.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Exact-match lookup by address.
    async fn find_by_addr(&self, addr: &AccountAddress) -> Result<Option<Account>>;

    /// Exact-match search on any combination of account fields.
    async fn search(&self, filter: &AccountFilter) -> Result<Vec<Account>>;
}

/// Shared transaction store.
pub type SharedTransactionStore = Arc<dyn TransactionStore>;

/// Shared account directory.
pub type SharedAccountDirectory = Arc<dyn AccountDirectory>;

#[async_trait]
impl<T: TransactionStore + ?Sized> TransactionStore for Arc<T> {
    async fn search(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>> {
        (**self).search(filter, page).await
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        (**self).get(id).await
    }

    async fn by_credit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        (**self).by_credit(addr).await
    }

    async fn by_debit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        (**self).by_debit(addr).await
    }
}

#[async_trait]
impl<T: AccountDirectory + ?Sized> AccountDirectory for Arc<T> {
    async fn find_by_addr(&self, addr: &AccountAddress) -> Result<Option<Account>> {
        (**self).find_by_addr(addr).await
    }

    async fn search(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        (**self).search(filter).await
    }
}
