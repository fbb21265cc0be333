//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// LedgerView CLI
#[derive(Parser, Debug)]
#[command(name = "ledgerview")]
#[command(about = "Query balances, counterparties and transactions of an existing ledger")]
pub struct Args {
    /// JSON fixture to serve instead of a database
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// PostgreSQL connection string
    #[arg(long)]
    pub database_url: Option<String>,

    /// Cache per-address transaction lookups
    #[arg(long)]
    pub cache: bool,

    /// Per-operation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Emit JSON logs
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search transactions; unset criteria are ignored
    Search {
        /// Address on either side
        #[arg(long)]
        addr: Option<String>,
        /// Exact amount
        #[arg(long)]
        amount: Option<Decimal>,
        /// Exact memo
        #[arg(long)]
        msg: Option<String>,
        /// Exact timestamp
        #[arg(long)]
        time: Option<Decimal>,
        /// Records to skip
        #[arg(long)]
        skip: Option<u64>,
        /// Maximum records to return
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Net balance of an address
    Balance {
        addr: String,
        /// Include debit/credit totals
        #[arg(long)]
        breakdown: bool,
    },

    /// Accounts that transacted with an address
    Counterparties {
        addr: String,
        /// One entry per account instead of one per transaction
        #[arg(long)]
        distinct: bool,
    },

    /// A single transaction by id
    Tx { id: String },

    /// Every transaction touching an address
    History { addr: String },

    /// Search accounts; unset criteria are ignored
    Accounts {
        #[arg(long)]
        addr: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cover: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        sign: Option<String>,
    },

    /// A single account by address
    Account { addr: String },

    /// Create the ledger tables in the configured database
    InitSchema,
}
