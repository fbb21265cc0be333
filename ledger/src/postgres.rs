//! PostgreSQL-backed transaction store and account directory.
//!
//! Natural order is the `seq` column, assigned on insert by the writer that
//! owns these tables. Any failure talking to the database, including rows the
//! engine cannot decode, surfaces as `StoreUnavailable`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{debug, info};

use ledgerview_common::{
    Account, AccountAddress, LedgerError, Result, Transaction, TransactionId,
};

use crate::filter::{AccountFilter, Page, TransactionFilter};
use crate::store::{AccountDirectory, TransactionStore};

macro_rules! select_transactions {
    () => {
        "SELECT id, credit, debit, amount, \"time\", sign, hash, msg FROM transactions"
    };
}

macro_rules! select_accounts {
    () => {
        "SELECT addr, name, cover, \"desc\", sign FROM accounts"
    };
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS transactions (
        id      UUID PRIMARY KEY,
        seq     BIGSERIAL NOT NULL UNIQUE,
        credit  TEXT NOT NULL,
        debit   TEXT NOT NULL,
        amount  NUMERIC NOT NULL,
        "time"  NUMERIC NOT NULL,
        sign    TEXT NOT NULL,
        hash    TEXT,
        msg     TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS transactions_credit_idx ON transactions (credit, seq)",
    "CREATE INDEX IF NOT EXISTS transactions_debit_idx ON transactions (debit, seq)",
    r#"CREATE TABLE IF NOT EXISTS accounts (
        addr    TEXT PRIMARY KEY,
        seq     BIGSERIAL NOT NULL UNIQUE,
        name    TEXT,
        cover   TEXT,
        "desc"  TEXT,
        sign    TEXT NOT NULL
    )"#,
];

fn store_error(err: sqlx::Error) -> LedgerError {
    LedgerError::StoreUnavailable(err.to_string())
}

fn transaction_from_row(row: &PgRow) -> std::result::Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        id: TransactionId::from_uuid(row.try_get("id")?),
        credit: AccountAddress::new(row.try_get::<String, _>("credit")?),
        debit: AccountAddress::new(row.try_get::<String, _>("debit")?),
        amount: row.try_get("amount")?,
        time: row.try_get("time")?,
        sign: row.try_get("sign")?,
        hash: row.try_get("hash")?,
        msg: row.try_get("msg")?,
    })
}

fn account_from_row(row: &PgRow) -> std::result::Result<Account, sqlx::Error> {
    Ok(Account {
        addr: AccountAddress::new(row.try_get::<String, _>("addr")?),
        name: row.try_get("name")?,
        cover: row.try_get("cover")?,
        desc: row.try_get("desc")?,
        sign: row.try_get("sign")?,
    })
}

/// Appends `WHERE` before the first condition and `AND` before the rest.
struct Conditions {
    any: bool,
}

impl Conditions {
    fn new() -> Self {
        Self { any: false }
    }

    fn next<'q, 'a>(&mut self, qb: &'q mut QueryBuilder<'a, Postgres>) -> &'q mut QueryBuilder<'a, Postgres> {
        qb.push(if self.any { " AND " } else { " WHERE " });
        self.any = true;
        qb
    }
}

fn build_transaction_search(filter: &TransactionFilter, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(select_transactions!());
    let mut conditions = Conditions::new();

    if let Some(amount) = filter.amount {
        conditions.next(&mut qb).push("amount = ").push_bind(amount);
    }
    if let Some(addr) = &filter.addr {
        conditions
            .next(&mut qb)
            .push("(credit = ")
            .push_bind(addr.as_str().to_owned())
            .push(" OR debit = ")
            .push_bind(addr.as_str().to_owned())
            .push(")");
    }
    if let Some(msg) = &filter.msg {
        conditions.next(&mut qb).push("msg = ").push_bind(msg.clone());
    }
    if let Some(time) = filter.time {
        conditions.next(&mut qb).push("\"time\" = ").push_bind(time);
    }

    qb.push(" ORDER BY seq OFFSET ")
        .push_bind(i64::try_from(page.skip).unwrap_or(i64::MAX))
        .push(" LIMIT ")
        .push_bind(i64::from(page.limit));
    qb
}

fn build_account_search(filter: &AccountFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(select_accounts!());
    let mut conditions = Conditions::new();

    if let Some(addr) = &filter.addr {
        conditions.next(&mut qb).push("addr = ").push_bind(addr.as_str().to_owned());
    }
    for (column, value) in [
        ("name", &filter.name),
        ("cover", &filter.cover),
        ("\"desc\"", &filter.desc),
        ("sign", &filter.sign),
    ] {
        if let Some(value) = value {
            conditions
                .next(&mut qb)
                .push(column)
                .push(" = ")
                .push_bind(value.clone());
        }
    }

    qb.push(" ORDER BY seq");
    qb
}

/// Transaction store and account directory over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Connect a new pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(store_error)?;

        info!(max_connections, "Connected to ledger database");
        Ok(Self { pool })
    }

    /// Use an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the ledger tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
        }
        Ok(())
    }

    async fn transactions_where(&self, sql: &'static str, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(sql)
            .bind(addr.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.iter()
            .map(transaction_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_error)
    }
}

#[async_trait]
impl TransactionStore for PgLedgerStore {
    async fn search(&self, filter: &TransactionFilter, page: Page) -> Result<Vec<Transaction>> {
        let mut qb = build_transaction_search(filter, page);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_error)?;
        debug!(count = rows.len(), "Postgres search");

        rows.iter()
            .map(transaction_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_error)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(concat!(select_transactions!(), " WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref()
            .map(transaction_from_row)
            .transpose()
            .map_err(store_error)
    }

    async fn by_credit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.transactions_where(
            concat!(select_transactions!(), " WHERE credit = $1 ORDER BY seq"),
            addr,
        )
        .await
    }

    async fn by_debit(&self, addr: &AccountAddress) -> Result<Vec<Transaction>> {
        self.transactions_where(
            concat!(select_transactions!(), " WHERE debit = $1 ORDER BY seq"),
            addr,
        )
        .await
    }
}

#[async_trait]
impl AccountDirectory for PgLedgerStore {
    async fn find_by_addr(&self, addr: &AccountAddress) -> Result<Option<Account>> {
        let row = sqlx::query(concat!(select_accounts!(), " WHERE addr = $1"))
            .bind(addr.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(store_error)
    }

    async fn search(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        let mut qb = build_account_search(filter);
        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_error)?;

        rows.iter()
            .map(account_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_error)
    }
}
