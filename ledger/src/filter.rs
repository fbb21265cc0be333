//! Filter predicates and pagination for ledger searches.
//!
//! Every criterion is optional. An unset criterion is left out of the
//! predicate entirely, and a set one is an exact match. There are no sentinel
//! values: `Some(Decimal::ZERO)` and `Some(String::new())` constrain the
//! search like any other value.

use ledgerview_common::{Account, AccountAddress, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 100;

/// Filter criteria for transaction searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Exact amount.
    pub amount: Option<Decimal>,
    /// Address on either the credit or the debit side.
    pub addr: Option<AccountAddress>,
    /// Exact memo text.
    pub msg: Option<String>,
    /// Exact timestamp.
    pub time: Option<Decimal>,
}

impl TransactionFilter {
    /// Filter that matches every transaction.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_addr(mut self, addr: impl Into<AccountAddress>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_time(mut self, time: Decimal) -> Self {
        self.time = Some(time);
        self
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.addr.is_none() && self.msg.is_none() && self.time.is_none()
    }

    /// Evaluate the predicate against a single record.
    ///
    /// A `msg` criterion never matches a record without a memo.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(amount) = &self.amount {
            if &tx.amount != amount {
                return false;
            }
        }
        if let Some(addr) = &self.addr {
            if !tx.involves(addr) {
                return false;
            }
        }
        if let Some(msg) = &self.msg {
            if tx.msg.as_ref() != Some(msg) {
                return false;
            }
        }
        if let Some(time) = &self.time {
            if &tx.time != time {
                return false;
            }
        }
        true
    }
}

/// Filter criteria for account directory searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    pub addr: Option<AccountAddress>,
    pub name: Option<String>,
    pub cover: Option<String>,
    pub desc: Option<String>,
    pub sign: Option<String>,
}

impl AccountFilter {
    /// Filter that matches every account.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_addr(mut self, addr: impl Into<AccountAddress>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Evaluate the predicate against a single account.
    pub fn matches(&self, account: &Account) -> bool {
        fn field_matches(want: &Option<String>, have: &Option<String>) -> bool {
            match want {
                Some(want) => have.as_ref() == Some(want),
                None => true,
            }
        }

        self.addr.as_ref().map_or(true, |addr| &account.addr == addr)
            && field_matches(&self.name, &account.name)
            && field_matches(&self.cover, &account.cover)
            && field_matches(&self.desc, &account.desc)
            && self.sign.as_ref().map_or(true, |sign| &account.sign == sign)
    }
}

/// Offset pagination over a store's natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of matching records to skip.
    pub skip: u64,
    /// Maximum number of records to return.
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Create a page, falling back to [`DEFAULT_LIMIT`] when no limit is given.
    pub fn new(skip: Option<u64>, limit: Option<u32>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// The page that follows this one.
    pub fn next(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(u64::from(self.limit)),
            limit: self.limit,
        }
    }

    /// Cap the limit at `max`.
    pub fn clamp(self, max: u32) -> Self {
        Self {
            skip: self.skip,
            limit: self.limit.min(max),
        }
    }

    /// Apply skip and limit to an already-filtered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(skip)
            .take(self.limit as usize)
            .collect()
    }
}
