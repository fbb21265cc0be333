//! Ledger engine facade.
//!
//! Bundles the query engine, balance calculator and counterparty resolver
//! over one transaction store and one account directory. Every operation is a
//! stateless read, so a single engine can serve any number of concurrent
//! callers without coordination.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{instrument, warn};

use ledgerview_common::{Account, AccountAddress, LedgerError, Result, Transaction};

use crate::balance::{BalanceBreakdown, BalanceCalculator};
use crate::config::QueryConfig;
use crate::context::QueryContext;
use crate::counterparty::CounterpartyResolver;
use crate::filter::{AccountFilter, Page, TransactionFilter};
use crate::query::QueryEngine;
use crate::store::{
    AccountDirectory, SharedAccountDirectory, SharedTransactionStore, TransactionStore,
};

/// Read-side engine over an existing ledger.
#[derive(Clone)]
pub struct LedgerEngine {
    query: QueryEngine,
    balances: BalanceCalculator,
    counterparties: CounterpartyResolver,
    accounts: SharedAccountDirectory,
    config: QueryConfig,
}

impl LedgerEngine {
    /// Create a new ledger engine.
    pub fn new(
        transactions: SharedTransactionStore,
        accounts: SharedAccountDirectory,
        config: QueryConfig,
    ) -> Self {
        Self {
            query: QueryEngine::new(transactions.clone(), config.clone()),
            balances: BalanceCalculator::new(transactions.clone()),
            counterparties: CounterpartyResolver::new(transactions, accounts.clone()),
            accounts,
            config,
        }
    }

    /// Create an engine over a single backend implementing both stores.
    pub fn over<S>(store: Arc<S>, config: QueryConfig) -> Self
    where
        S: TransactionStore + AccountDirectory + 'static,
    {
        Self::new(store.clone(), store, config)
    }

    /// Engine configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Build a page from optional caller input.
    pub fn page(&self, skip: Option<u64>, limit: Option<u32>) -> Page {
        self.query.page(skip, limit)
    }

    fn scoped(&self, ctx: &QueryContext) -> QueryContext {
        ctx.clone().or_timeout(self.config.query_timeout)
    }

    /// Filtered, paginated transaction search.
    #[instrument(skip(self, ctx), fields(skip = page.skip, limit = page.limit))]
    pub async fn search(
        &self,
        ctx: &QueryContext,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>> {
        let ctx = self.scoped(ctx);
        self.query.search(&ctx, filter, page).await.map_err(log_failure)
    }

    /// Single transaction by identifier.
    #[instrument(skip(self, ctx))]
    pub async fn transaction(&self, ctx: &QueryContext, id: &str) -> Result<Transaction> {
        let ctx = self.scoped(ctx);
        self.query.transaction(&ctx, id).await.map_err(log_failure)
    }

    /// Every transaction touching an address.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn transactions_for(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Transaction>> {
        let ctx = self.scoped(ctx);
        self.query.transactions_for(&ctx, addr).await.map_err(log_failure)
    }

    /// Signed net balance of an address.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn balance(&self, ctx: &QueryContext, addr: &AccountAddress) -> Result<Decimal> {
        let ctx = self.scoped(ctx);
        self.balances.balance(&ctx, addr).await.map_err(log_failure)
    }

    /// Balance of an address with its debit/credit totals.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn balance_breakdown(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<BalanceBreakdown> {
        let ctx = self.scoped(ctx);
        self.balances.breakdown(&ctx, addr).await.map_err(log_failure)
    }

    /// Counterparties, one entry per resolved transaction.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn counterparties(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Account>> {
        let ctx = self.scoped(ctx);
        self.counterparties
            .counterparties(&ctx, addr)
            .await
            .map_err(log_failure)
    }

    /// Counterparties deduplicated by address.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn distinct_counterparties(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Account>> {
        let ctx = self.scoped(ctx);
        self.counterparties
            .distinct_counterparties(&ctx, addr)
            .await
            .map_err(log_failure)
    }

    /// Accounts matching every set field of `filter`.
    #[instrument(skip(self, ctx))]
    pub async fn accounts(&self, ctx: &QueryContext, filter: &AccountFilter) -> Result<Vec<Account>> {
        let ctx = self.scoped(ctx);
        ctx.run("account_search", self.accounts.search(filter))
            .await
            .map_err(log_failure)
    }

    /// Single account by address.
    #[instrument(skip(self, ctx, addr), fields(address = %addr))]
    pub async fn account(&self, ctx: &QueryContext, addr: &AccountAddress) -> Result<Account> {
        let ctx = self.scoped(ctx);
        ctx.run("find_by_addr", self.accounts.find_by_addr(addr))
            .await
            .map_err(log_failure)?
            .ok_or_else(|| LedgerError::account_not_found(addr))
    }
}

fn log_failure(err: LedgerError) -> LedgerError {
    if !err.is_not_found() {
        warn!(error = %err, code = err.error_code(), "Ledger read failed");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedgerStore;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn create_test_engine() -> (LedgerEngine, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        store.insert_account(Account::new("A", "sa").with_name("Alice")).unwrap();
        store.insert_account(Account::new("B", "sb").with_name("Bob")).unwrap();
        store.insert_transaction(Transaction::new("A", "B", dec!(10), dec!(1), "s1"));
        store.insert_transaction(Transaction::new("B", "A", dec!(4), dec!(2), "s2"));

        (LedgerEngine::over(store.clone(), QueryConfig::default()), store)
    }

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let (engine, _) = create_test_engine();
        let ctx = QueryContext::background();
        let a = AccountAddress::from("A");

        assert_eq!(engine.balance(&ctx, &a).await.unwrap(), dec!(-6));
        assert_eq!(engine.counterparties(&ctx, &a).await.unwrap().len(), 2);
        assert_eq!(engine.distinct_counterparties(&ctx, &a).await.unwrap().len(), 1);

        let page = engine.page(None, None);
        let found = engine
            .search(&ctx, &TransactionFilter::all().with_addr("A"), page)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_account_lookups() {
        let (engine, _) = create_test_engine();
        let ctx = QueryContext::background();

        let bob = engine.account(&ctx, &"B".into()).await.unwrap();
        assert_eq!(bob.name.as_deref(), Some("Bob"));

        let missing = engine.account(&ctx, &"Z".into()).await.unwrap_err();
        assert!(missing.is_not_found());

        let all = engine.accounts(&ctx, &AccountFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let named = engine
            .accounts(&ctx, &AccountFilter::all().with_name("Alice"))
            .await
            .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].addr.as_str(), "A");
    }

    #[tokio::test]
    async fn test_cancelled_context_yields_cancelled() {
        let (engine, _) = create_test_engine();
        let (ctx, handle) = QueryContext::cancellable();
        handle.cancel();

        let err = engine.balance(&ctx, &"A".into()).await.unwrap_err();
        assert_eq!(err, LedgerError::Cancelled);
    }

    #[tokio::test]
    async fn test_concurrent_reads_are_independent() {
        let (engine, _) = create_test_engine();

        let handles: Vec<_> = ["A", "B", "A", "B"]
            .into_iter()
            .map(|addr| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .balance(&QueryContext::background(), &addr.into())
                        .await
                })
            })
            .collect();

        let mut balances = Vec::new();
        for handle in handles {
            balances.push(handle.await.unwrap().unwrap());
        }
        assert_eq!(balances, vec![dec!(-6), dec!(6), dec!(-6), dec!(6)]);
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let config = QueryConfig {
            query_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        let engine = LedgerEngine::over(store, config);

        let balance = engine
            .balance(&QueryContext::background(), &"A".into())
            .await
            .unwrap();
        assert!(balance.is_zero());
    }
}
