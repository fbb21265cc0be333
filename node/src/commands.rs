//! Executes CLI commands against the engine and shapes their JSON output.

use serde::Serialize;
use serde_json::{json, Value};

use ledgerview_common::{AccountAddress, LedgerError, Result};
use ledgerview_ledger::{AccountFilter, LedgerEngine, QueryContext, TransactionFilter};

use crate::cli::Command;

/// Error body returned to the caller in place of a result.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&LedgerError> for ErrorResponse {
    fn from(err: &LedgerError) -> Self {
        Self {
            error: ErrorBody {
                code: err.error_code(),
                message: err.to_string(),
            },
        }
    }
}

/// Process exit status for a failed command.
///
/// "No such record" and "service unavailable" get distinct statuses so
/// scripts can tell a missing record from an outage.
pub fn exit_code(err: &LedgerError) -> i32 {
    match err {
        LedgerError::NotFound { .. } => 2,
        LedgerError::StoreUnavailable(_)
        | LedgerError::DeadlineExceeded { .. }
        | LedgerError::Cancelled => 3,
        _ => 1,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| LedgerError::ConfigurationError(format!("cannot encode result: {e}")))
}

/// Run one read command.
pub async fn execute(engine: &LedgerEngine, ctx: &QueryContext, command: Command) -> Result<Value> {
    match command {
        Command::Search {
            addr,
            amount,
            msg,
            time,
            skip,
            limit,
        } => {
            let filter = TransactionFilter {
                amount,
                addr: addr.map(AccountAddress::from),
                msg,
                time,
            };
            let page = engine.page(skip, limit);
            let found = engine.search(ctx, &filter, page).await?;
            Ok(json!({
                "skip": page.skip,
                "limit": page.limit,
                "count": found.len(),
                "transactions": to_json(&found)?,
            }))
        }

        Command::Balance { addr, breakdown } => {
            let addr = AccountAddress::from(addr);
            if breakdown {
                to_json(&engine.balance_breakdown(ctx, &addr).await?)
            } else {
                let balance = engine.balance(ctx, &addr).await?;
                Ok(json!({ "address": addr, "balance": balance }))
            }
        }

        Command::Counterparties { addr, distinct } => {
            let addr = AccountAddress::from(addr);
            let accounts = if distinct {
                engine.distinct_counterparties(ctx, &addr).await?
            } else {
                engine.counterparties(ctx, &addr).await?
            };
            Ok(json!({
                "address": addr,
                "distinct": distinct,
                "counterparties": to_json(&accounts)?,
            }))
        }

        Command::Tx { id } => to_json(&engine.transaction(ctx, &id).await?),

        Command::History { addr } => {
            let addr = AccountAddress::from(addr);
            let history = engine.transactions_for(ctx, &addr).await?;
            Ok(json!({ "address": addr, "transactions": to_json(&history)? }))
        }

        Command::Accounts {
            addr,
            name,
            cover,
            desc,
            sign,
        } => {
            let filter = AccountFilter {
                addr: addr.map(AccountAddress::from),
                name,
                cover,
                desc,
                sign,
            };
            to_json(&engine.accounts(ctx, &filter).await?)
        }

        Command::Account { addr } => {
            to_json(&engine.account(ctx, &AccountAddress::from(addr)).await?)
        }

        Command::InitSchema => Err(LedgerError::ConfigurationError(
            "init-schema is handled by the node before the engine starts".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerview_common::{Account, Transaction};
    use ledgerview_ledger::{InMemoryLedgerStore, QueryConfig};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn create_test_engine() -> (LedgerEngine, Arc<InMemoryLedgerStore>, Transaction) {
        let store = Arc::new(InMemoryLedgerStore::new());
        store.insert_account(Account::new("A", "sa")).unwrap();
        store.insert_account(Account::new("B", "sb").with_name("Bob")).unwrap();
        let t1 = Transaction::new("A", "B", dec!(10), dec!(1), "s1");
        store.insert_transaction(t1.clone());
        store.insert_transaction(Transaction::new("B", "A", dec!(4), dec!(2), "s2"));
        (LedgerEngine::over(store.clone(), QueryConfig::default()), store, t1)
    }

    #[tokio::test]
    async fn test_balance_output() {
        let (engine, _, _) = create_test_engine();
        let ctx = QueryContext::background();

        let value = execute(
            &engine,
            &ctx,
            Command::Balance {
                addr: "A".into(),
                breakdown: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(value["address"], "A");
        assert_eq!(value["balance"], "-6");
    }

    #[tokio::test]
    async fn test_search_output_reports_page() {
        let (engine, _, _) = create_test_engine();
        let value = execute(
            &engine,
            &QueryContext::background(),
            Command::Search {
                addr: Some("A".into()),
                amount: None,
                msg: None,
                time: None,
                skip: Some(1),
                limit: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(value["skip"], 1);
        assert_eq!(value["limit"], 100);
        assert_eq!(value["count"], 1);
    }

    #[tokio::test]
    async fn test_counterparties_output() {
        let (engine, _, _) = create_test_engine();
        let value = execute(
            &engine,
            &QueryContext::background(),
            Command::Counterparties {
                addr: "A".into(),
                distinct: false,
            },
        )
        .await
        .unwrap();

        let counterparties = value["counterparties"].as_array().unwrap();
        assert_eq!(counterparties.len(), 2);
        assert_eq!(counterparties[0]["name"], "Bob");
    }

    #[tokio::test]
    async fn test_tx_lookup_and_missing_record() {
        let (engine, _, t1) = create_test_engine();
        let ctx = QueryContext::background();

        let value = execute(&engine, &ctx, Command::Tx { id: t1.id.to_string() })
            .await
            .unwrap();
        assert_eq!(value["credit"], "A");

        let err = execute(
            &engine,
            &ctx,
            Command::Account {
                addr: "nobody".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(exit_code(&err), 2);

        let response = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(response["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_outage_maps_to_service_error() {
        let (engine, store, _) = create_test_engine();
        store.set_available(false);

        let err = execute(
            &engine,
            &QueryContext::background(),
            Command::History { addr: "A".into() },
        )
        .await
        .unwrap_err();

        assert_eq!(exit_code(&err), 3);
        assert_eq!(ErrorResponse::from(&err).error.code, "STORE_UNAVAILABLE");
    }
}
