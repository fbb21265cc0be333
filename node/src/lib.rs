//! LedgerView node
//!
//! Wires configuration, a storage backend and the ledger engine into a
//! command-line front end that prints JSON results.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;

pub use backend::{build_engine, connect_postgres, load_fixture};
pub use cli::{Args, Command};
pub use commands::{execute, exit_code, ErrorResponse};
pub use config::{BackendConfig, NodeConfig};
