//! Ledger records as read from the transaction store and account directory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identifiers::{AccountAddress, TransactionId};

/// A directed value-transfer record.
///
/// `credit` is the source side and `debit` the destination side. Both may name
/// the same address; self-transfers are ordinary records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier. Required when decoding so that ids stay
    /// stable across loads of the same snapshot.
    pub id: TransactionId,
    /// Outgoing side.
    pub credit: AccountAddress,
    /// Incoming side.
    pub debit: AccountAddress,
    /// Transfer magnitude (unit-less).
    pub amount: Decimal,
    /// Recorded-at timestamp.
    pub time: Decimal,
    /// Opaque attestation.
    pub sign: String,
    /// Content identifier.
    #[serde(default)]
    pub hash: Option<String>,
    /// Free-text memo.
    #[serde(default)]
    pub msg: Option<String>,
}

impl Transaction {
    /// Create a new transaction with a fresh identifier.
    pub fn new(
        credit: impl Into<AccountAddress>,
        debit: impl Into<AccountAddress>,
        amount: Decimal,
        time: Decimal,
        sign: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            credit: credit.into(),
            debit: debit.into(),
            amount,
            time,
            sign: sign.into(),
            hash: None,
            msg: None,
        }
    }

    /// Attach a content hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Attach a memo.
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Whether the address appears on either side.
    pub fn involves(&self, addr: &AccountAddress) -> bool {
        &self.credit == addr || &self.debit == addr
    }

    /// Whether both sides name the same address.
    pub fn is_self_transfer(&self) -> bool {
        self.credit == self.debit
    }
}

/// An identity record keyed by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique key.
    pub addr: AccountAddress,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Cover image reference.
    #[serde(default)]
    pub cover: Option<String>,
    /// Description.
    #[serde(default)]
    pub desc: Option<String>,
    /// Required attestation.
    pub sign: String,
}

impl Account {
    /// Create an account with no display metadata.
    pub fn new(addr: impl Into<AccountAddress>, sign: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            name: None,
            cover: None,
            desc: None,
            sign: sign.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}
