//! Ledger query engine: filtered, paginated search and record lookups.

use tracing::debug;

use ledgerview_common::{AccountAddress, LedgerError, Result, Transaction, TransactionId};

use crate::config::QueryConfig;
use crate::context::QueryContext;
use crate::filter::{Page, TransactionFilter};
use crate::store::{SharedTransactionStore, TransactionStore};

/// Fetch the credit-side and debit-side transactions of an address.
///
/// Both lookups run concurrently under the caller's context. The first failure
/// aborts the other, so either both complete sets come back or an error does.
pub(crate) async fn fetch_sides(
    store: &SharedTransactionStore,
    ctx: &QueryContext,
    addr: &AccountAddress,
) -> Result<(Vec<Transaction>, Vec<Transaction>)> {
    let (credits, debits) = futures::try_join!(
        ctx.run("by_credit", store.by_credit(addr)),
        ctx.run("by_debit", store.by_debit(addr)),
    )?;

    debug!(
        address = %addr,
        credits = credits.len(),
        debits = debits.len(),
        "Fetched both sides"
    );

    Ok((credits, debits))
}

/// Executes bounded searches over a transaction store.
#[derive(Clone)]
pub struct QueryEngine {
    store: SharedTransactionStore,
    config: QueryConfig,
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(store: SharedTransactionStore, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Build a page from optional caller input, applying the configured
    /// default and maximum limits.
    pub fn page(&self, skip: Option<u64>, limit: Option<u32>) -> Page {
        Page::new(skip, Some(limit.unwrap_or(self.config.default_limit)))
            .clamp(self.config.max_limit)
    }

    /// Return one page of transactions matching `filter`.
    ///
    /// No match is an empty page, not an error.
    pub async fn search(
        &self,
        ctx: &QueryContext,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>> {
        let page = page.clamp(self.config.max_limit);
        if page.limit == 0 {
            return Ok(Vec::new());
        }

        let mut found = ctx.run("search", self.store.search(filter, page)).await?;
        found.truncate(page.limit as usize);

        debug!(
            count = found.len(),
            skip = page.skip,
            limit = page.limit,
            filtered = !filter.is_empty(),
            "Search complete"
        );

        Ok(found)
    }

    /// Fetch a single transaction by its string identifier.
    pub async fn transaction(&self, ctx: &QueryContext, id: &str) -> Result<Transaction> {
        let id = TransactionId::parse(id)?;
        ctx.run("get", self.store.get(id))
            .await?
            .ok_or_else(|| LedgerError::transaction_not_found(id))
    }

    /// Every transaction touching `addr`: credit-side records first, then
    /// debit-side records. A self-transfer appears once per side.
    pub async fn transactions_for(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Transaction>> {
        let (mut credits, debits) = fetch_sides(&self.store, ctx, addr).await?;
        credits.extend(debits);
        Ok(credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedgerStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn engine_with(txs: Vec<Transaction>) -> (QueryEngine, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        for tx in txs {
            store.insert_transaction(tx);
        }
        (QueryEngine::new(store.clone(), QueryConfig::default()), store)
    }

    #[tokio::test]
    async fn test_search_by_address_returns_both_sides() {
        let t1 = Transaction::new("A", "B", dec!(10), dec!(1), "s1");
        let t2 = Transaction::new("B", "A", dec!(4), dec!(2), "s2");
        let t3 = Transaction::new("B", "C", dec!(1), dec!(3), "s3");
        let (engine, _) = engine_with(vec![t1.clone(), t2.clone(), t3]);

        let ctx = QueryContext::background();
        let found = engine
            .search(&ctx, &TransactionFilter::all().with_addr("A"), Page::new(Some(0), Some(100)))
            .await
            .unwrap();

        assert_eq!(found, vec![t1, t2]);
    }

    #[tokio::test]
    async fn test_search_respects_max_limit() {
        let txs: Vec<Transaction> = (0..20)
            .map(|i| Transaction::new("A", "B", dec!(1), i.into(), "s"))
            .collect();
        let store = Arc::new(InMemoryLedgerStore::new());
        for tx in txs {
            store.insert_transaction(tx);
        }
        let config = QueryConfig {
            max_limit: 5,
            ..Default::default()
        };
        let engine = QueryEngine::new(store, config);

        let page = engine.page(None, Some(50));
        assert_eq!(page.limit, 5);

        let found = engine
            .search(&QueryContext::background(), &TransactionFilter::all(), Page::new(None, Some(50)))
            .await
            .unwrap();
        assert_eq!(found.len(), 5);
    }

    #[tokio::test]
    async fn test_zero_limit_is_empty_page() {
        let (engine, _) = engine_with(vec![Transaction::new("A", "B", dec!(1), dec!(1), "s")]);
        let found = engine
            .search(&QueryContext::background(), &TransactionFilter::all(), Page::new(None, Some(0)))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_lookup_errors() {
        let t1 = Transaction::new("A", "B", dec!(10), dec!(1), "s1");
        let (engine, _) = engine_with(vec![t1.clone()]);
        let ctx = QueryContext::background();

        assert_eq!(engine.transaction(&ctx, &t1.id.to_string()).await.unwrap(), t1);

        let missing = engine
            .transaction(&ctx, &TransactionId::new().to_string())
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        let malformed = engine.transaction(&ctx, "nope").await.unwrap_err();
        assert!(matches!(malformed, LedgerError::InvalidIdentifier { .. }));
    }

    #[tokio::test]
    async fn test_transactions_for_lists_self_transfer_per_side() {
        let t1 = Transaction::new("A", "B", dec!(1), dec!(1), "s1");
        let t2 = Transaction::new("A", "A", dec!(2), dec!(2), "s2");
        let t3 = Transaction::new("C", "A", dec!(3), dec!(3), "s3");
        let (engine, _) = engine_with(vec![t1.clone(), t2.clone(), t3.clone()]);

        let history = engine
            .transactions_for(&QueryContext::background(), &AccountAddress::from("A"))
            .await
            .unwrap();

        assert_eq!(history, vec![t1, t2.clone(), t2, t3]);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_an_empty_result() {
        let (engine, store) = engine_with(vec![Transaction::new("A", "B", dec!(1), dec!(1), "s")]);
        store.set_available(false);

        let err = engine
            .search(&QueryContext::background(), &TransactionFilter::all(), Page::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::StoreUnavailable(_)));
    }
}
