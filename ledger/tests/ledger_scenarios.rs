//! End-to-end scenarios over the in-memory and cached stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use ledgerview_ledger::{
    Account, AccountAddress, AccountFilter, CachedTransactionStore, InMemoryLedgerStore,
    LedgerEngine, LedgerError, Page, QueryConfig, QueryContext, Result, Transaction,
    TransactionFilter, TransactionId, TransactionStore,
};

fn two_party_store() -> (Arc<InMemoryLedgerStore>, Transaction, Transaction) {
    let store = Arc::new(InMemoryLedgerStore::new());
    store.insert_account(Account::new("A", "sa")).unwrap();
    store.insert_account(Account::new("B", "sb")).unwrap();

    let t1 = Transaction::new("A", "B", dec!(10), dec!(1700000000), "s1").with_msg("rent");
    let t2 = Transaction::new("B", "A", dec!(4), dec!(1700000001), "s2").with_hash("h2");
    store.insert_transaction(t1.clone());
    store.insert_transaction(t2.clone());
    (store, t1, t2)
}

#[tokio::test]
async fn two_party_ledger() {
    let (store, t1, t2) = two_party_store();
    let engine = LedgerEngine::over(store, QueryConfig::default());
    let ctx = QueryContext::background();
    let a = AccountAddress::from("A");
    let b = AccountAddress::from("B");

    assert_eq!(engine.balance(&ctx, &a).await.unwrap(), dec!(-6));
    assert_eq!(engine.balance(&ctx, &b).await.unwrap(), dec!(6));

    let raw: Vec<_> = engine
        .counterparties(&ctx, &a)
        .await
        .unwrap()
        .into_iter()
        .map(|acc| acc.addr)
        .collect();
    assert_eq!(raw, vec![b.clone(), b.clone()]);

    let found = engine
        .search(&ctx, &TransactionFilter::all().with_addr("A"), Page::new(Some(0), Some(100)))
        .await
        .unwrap();
    assert_eq!(found, vec![t1.clone(), t2.clone()]);

    let by_msg = engine
        .search(&ctx, &TransactionFilter::all().with_msg("rent"), engine.page(None, None))
        .await
        .unwrap();
    assert_eq!(by_msg, vec![t1]);

    let by_time = engine
        .search(
            &ctx,
            &TransactionFilter::all().with_time(dec!(1700000001)),
            engine.page(None, None),
        )
        .await
        .unwrap();
    assert_eq!(by_time, vec![t2]);
}

#[tokio::test]
async fn zero_amount_records_are_searchable() {
    let store = Arc::new(InMemoryLedgerStore::new());
    let zero = Transaction::new("A", "B", dec!(0), dec!(0), "s0").with_msg("");
    store.insert_transaction(zero.clone());
    store.insert_transaction(Transaction::new("A", "B", dec!(5), dec!(9), "s1").with_msg("x"));
    let engine = LedgerEngine::over(store, QueryConfig::default());
    let ctx = QueryContext::background();

    let filter = TransactionFilter::all()
        .with_amount(dec!(0))
        .with_time(dec!(0))
        .with_msg("");
    let found = engine.search(&ctx, &filter, Page::default()).await.unwrap();
    assert_eq!(found, vec![zero]);
}

#[tokio::test]
async fn every_operation_surfaces_store_failure() {
    let (store, t1, _) = two_party_store();
    let engine = LedgerEngine::over(store.clone(), QueryConfig::default());
    let ctx = QueryContext::background();
    let a = AccountAddress::from("A");
    store.set_available(false);

    let unavailable = |r: Result<()>| matches!(r, Err(LedgerError::StoreUnavailable(_)));

    assert!(unavailable(engine.balance(&ctx, &a).await.map(|_| ())));
    assert!(unavailable(engine.counterparties(&ctx, &a).await.map(|_| ())));
    assert!(unavailable(
        engine
            .search(&ctx, &TransactionFilter::all(), Page::default())
            .await
            .map(|_| ())
    ));
    assert!(unavailable(engine.transaction(&ctx, &t1.id.to_string()).await.map(|_| ())));
    assert!(unavailable(engine.account(&ctx, &a).await.map(|_| ())));
    assert!(unavailable(engine.accounts(&ctx, &AccountFilter::all()).await.map(|_| ())));
}

#[tokio::test]
async fn cached_engine_reflects_invalidation() {
    let (store, _, _) = two_party_store();
    let cached = Arc::new(CachedTransactionStore::new(store.clone()));
    let engine = LedgerEngine::new(cached.clone(), store.clone(), QueryConfig::default());
    let ctx = QueryContext::background();
    let a = AccountAddress::from("A");

    assert_eq!(engine.balance(&ctx, &a).await.unwrap(), dec!(-6));

    store.insert_transaction(Transaction::new("B", "A", dec!(6), dec!(2), "s3"));
    assert_eq!(engine.balance(&ctx, &a).await.unwrap(), dec!(-6));

    cached.invalidate(&a);
    assert_eq!(engine.balance(&ctx, &a).await.unwrap(), dec!(0));
}

/// Store whose side lookups never complete.
struct StalledStore;

#[async_trait]
impl TransactionStore for StalledStore {
    async fn search(&self, _: &TransactionFilter, _: Page) -> Result<Vec<Transaction>> {
        std::future::pending().await
    }

    async fn get(&self, _: TransactionId) -> Result<Option<Transaction>> {
        std::future::pending().await
    }

    async fn by_credit(&self, _: &AccountAddress) -> Result<Vec<Transaction>> {
        Ok(vec![Transaction::new("A", "B", dec!(1), dec!(1), "partial")])
    }

    async fn by_debit(&self, _: &AccountAddress) -> Result<Vec<Transaction>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn deadline_discards_partial_fetch() {
    let directory = Arc::new(InMemoryLedgerStore::new());
    let engine = LedgerEngine::new(Arc::new(StalledStore), directory, QueryConfig::default());
    let ctx = QueryContext::with_timeout(Duration::from_millis(30));

    let err = engine.balance(&ctx, &"A".into()).await.unwrap_err();
    assert!(matches!(err, LedgerError::DeadlineExceeded { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn configured_timeout_bounds_search() {
    let directory = Arc::new(InMemoryLedgerStore::new());
    let config = QueryConfig {
        query_timeout: Some(Duration::from_millis(30)),
        ..Default::default()
    };
    let engine = LedgerEngine::new(Arc::new(StalledStore), directory, config);

    let err = engine
        .search(&QueryContext::background(), &TransactionFilter::all(), Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DeadlineExceeded { .. }));
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_counterparties() {
    let directory = Arc::new(InMemoryLedgerStore::new());
    let engine = LedgerEngine::new(Arc::new(StalledStore), directory, QueryConfig::default());
    let (ctx, handle) = QueryContext::cancellable();

    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.counterparties(&ctx, &"A".into()).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.cancel();

    let result = task.await.unwrap();
    assert_eq!(result.unwrap_err(), LedgerError::Cancelled);
}
