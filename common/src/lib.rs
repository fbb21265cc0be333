//! LedgerView Common Types
//!
//! Shared types for the LedgerView workspace: account addresses, transaction
//! identifiers, the transaction and account records read from the stores, and
//! the error taxonomy surfaced by every read operation.

pub mod identifiers;
pub mod model;
pub mod error;

pub use identifiers::*;
pub use model::*;
pub use error::*;
