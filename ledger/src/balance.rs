//! Derived account balances.
//!
//! Sign convention of this ledger: appearing on the `debit` side adds the
//! amount to an address's balance, appearing on the `credit` side subtracts
//! it. A self-transfer does both and nets to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ledgerview_common::{AccountAddress, LedgerError, Result, Transaction};

use crate::context::QueryContext;
use crate::query::fetch_sides;
use crate::store::SharedTransactionStore;

/// Balance of an address together with the totals it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceBreakdown {
    /// Address the balance belongs to.
    pub address: AccountAddress,
    /// Sum of amounts where the address is the debit side.
    pub debited: Decimal,
    /// Sum of amounts where the address is the credit side.
    pub credited: Decimal,
    /// Number of debit-side transactions.
    pub debit_count: usize,
    /// Number of credit-side transactions.
    pub credit_count: usize,
    /// `debited - credited`.
    pub net: Decimal,
}

impl BalanceBreakdown {
    /// Zero balance for an address with no transactions.
    pub fn zero(address: AccountAddress) -> Self {
        Self {
            address,
            debited: Decimal::ZERO,
            credited: Decimal::ZERO,
            debit_count: 0,
            credit_count: 0,
            net: Decimal::ZERO,
        }
    }

    /// Derive the breakdown from the two side sets of an address.
    ///
    /// Each side total must itself fit in a `Decimal`, so a side that
    /// overflows is reported even when the net would have fit.
    pub fn from_sides(
        address: AccountAddress,
        credits: &[Transaction],
        debits: &[Transaction],
    ) -> Result<Self> {
        let overflow = || LedgerError::BalanceOverflow(address.to_string());

        let debited = sum_amounts(debits).ok_or_else(overflow)?;
        let credited = sum_amounts(credits).ok_or_else(overflow)?;
        let net = debited.checked_sub(credited).ok_or_else(overflow)?;

        Ok(Self {
            address,
            debited,
            credited,
            debit_count: debits.len(),
            credit_count: credits.len(),
            net,
        })
    }

    /// Whether the address has never appeared in a transaction.
    pub fn is_untouched(&self) -> bool {
        self.debit_count == 0 && self.credit_count == 0
    }
}

fn sum_amounts(transactions: &[Transaction]) -> Option<Decimal> {
    transactions
        .iter()
        .try_fold(Decimal::ZERO, |acc, tx| acc.checked_add(tx.amount))
}

/// Derives balances by re-scanning the transaction store on every call.
#[derive(Clone)]
pub struct BalanceCalculator {
    store: SharedTransactionStore,
}

impl BalanceCalculator {
    /// Create a new balance calculator.
    pub fn new(store: SharedTransactionStore) -> Self {
        Self { store }
    }

    /// Signed net balance of `addr`.
    pub async fn balance(&self, ctx: &QueryContext, addr: &AccountAddress) -> Result<Decimal> {
        Ok(self.breakdown(ctx, addr).await?.net)
    }

    /// Balance of `addr` with its debit and credit totals.
    pub async fn breakdown(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<BalanceBreakdown> {
        let (credits, debits) = fetch_sides(&self.store, ctx, addr).await?;
        let breakdown = BalanceBreakdown::from_sides(addr.clone(), &credits, &debits)?;

        debug!(
            address = %addr,
            debited = %breakdown.debited,
            credited = %breakdown.credited,
            net = %breakdown.net,
            "Balance derived"
        );

        Ok(breakdown)
    }
}
