//! Counterparty discovery.
//!
//! For every transaction where the address is the credit side, the debit
//! side's account is a counterparty, and vice versa. Two views are offered:
//!
//! - [`CounterpartyResolver::counterparties`] keeps one entry per resolved
//!   transaction (credit-side transactions first, then debit-side ones, each
//!   in store order), so an account appears as many times as it transacted.
//! - [`CounterpartyResolver::distinct_counterparties`] keeps only the first
//!   occurrence of each address from that sequence.
//!
//! A counterparty address with no account record contributes nothing.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use tracing::debug;

use ledgerview_common::{Account, AccountAddress, LedgerError, Result};

use crate::context::QueryContext;
use crate::query::fetch_sides;
use crate::store::{AccountDirectory, SharedAccountDirectory, SharedTransactionStore};

/// Resolves the accounts on the far side of an address's transactions.
#[derive(Clone)]
pub struct CounterpartyResolver {
    transactions: SharedTransactionStore,
    accounts: SharedAccountDirectory,
}

impl CounterpartyResolver {
    /// Create a new resolver.
    pub fn new(transactions: SharedTransactionStore, accounts: SharedAccountDirectory) -> Self {
        Self {
            transactions,
            accounts,
        }
    }

    /// One counterparty entry per resolved transaction, duplicates included.
    pub async fn counterparties(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Account>> {
        let (credits, debits) = fetch_sides(&self.transactions, ctx, addr).await?;

        let far_sides: Vec<AccountAddress> = credits
            .into_iter()
            .map(|tx| tx.debit)
            .chain(debits.into_iter().map(|tx| tx.credit))
            .collect();

        let directory = self.lookup_all(ctx, &far_sides).await?;

        let resolved: Vec<Account> = far_sides
            .iter()
            .filter_map(|far| directory.get(far).cloned().flatten())
            .collect();

        debug!(
            address = %addr,
            transactions = far_sides.len(),
            resolved = resolved.len(),
            "Counterparties resolved"
        );

        Ok(resolved)
    }

    /// Counterparties deduplicated by address, in first-seen order.
    pub async fn distinct_counterparties(
        &self,
        ctx: &QueryContext,
        addr: &AccountAddress,
    ) -> Result<Vec<Account>> {
        let mut seen = HashSet::new();
        Ok(self
            .counterparties(ctx, addr)
            .await?
            .into_iter()
            .filter(|account| seen.insert(account.addr.clone()))
            .collect())
    }

    /// Look up each distinct address once, concurrently.
    async fn lookup_all(
        &self,
        ctx: &QueryContext,
        addrs: &[AccountAddress],
    ) -> Result<HashMap<AccountAddress, Option<Account>>> {
        let mut unique = HashSet::new();
        let lookups = addrs
            .iter()
            .filter(|addr| unique.insert(*addr))
            .map(|addr| async move {
                let account = ctx
                    .run("find_by_addr", self.accounts.find_by_addr(addr))
                    .await?;
                Ok::<_, LedgerError>((addr.clone(), account))
            });

        Ok(try_join_all(lookups).await?.into_iter().collect())
    }
}
