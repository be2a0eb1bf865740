//! # Deposits & the Payer Balance Sheet
//!
//! Every record the registry creates must carry a deposit proportional to
//! its size, paid by the instruction's designated payer. Deposits are the
//! substrate's storage-pricing mechanism: they discourage junk records and
//! pay for the bytes a record occupies. The registry never reclaims or
//! closes records, so deposits for abandoned namespaces or
//! failed-mid-pipeline objects are leaked permanently. That is a documented
//! property of the design, not an accident.
//!
//! Amounts are denominated in *motes*, the smallest accounting unit.
//! All arithmetic is checked — wrapping arithmetic and money do not mix.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::address::Address;
use crate::config::{DEPOSIT_BASE_MOTES, DEPOSIT_PER_BYTE_MOTES};

/// Errors raised by the balance sheet.
#[derive(Debug, Error)]
pub enum DepositError {
    /// The payer's balance cannot cover the requested debit.
    #[error("insufficient payer balance: have {balance}, need {required}")]
    InsufficientBalance {
        /// Current payer balance in motes.
        balance: u64,
        /// Amount the operation needed.
        required: u64,
    },

    /// A balance operation would overflow u64.
    #[error("balance overflow")]
    Overflow,
}

/// The minimum deposit a record of `len` bytes must carry.
///
/// Flat base plus a per-byte component. Records below this deposit are
/// considered under-funded and get topped up from the payer on the next
/// write that touches them.
pub fn minimum_deposit(len: usize) -> u64 {
    DEPOSIT_BASE_MOTES.saturating_add(DEPOSIT_PER_BYTE_MOTES.saturating_mul(len as u64))
}

/// Tracks payer balances and per-record deposits.
///
/// A flat map, same shape as the account-state stores elsewhere in the
/// system. The substrate's ledger is the source of truth for real funds;
/// this sheet models exactly the slice the registry touches: payers fund
/// record deposits, records hold them forever.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Spendable balances keyed by payer address.
    balances: HashMap<Address, u64>,
    /// Deposits currently held by records, keyed by record address.
    deposits: HashMap<Address, u64>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits a payer with spendable motes. Used by genesis/test setup and
    /// the node's faucet endpoint on dev networks.
    pub fn credit(&mut self, payer: Address, amount: u64) -> Result<(), DepositError> {
        let balance = self.balances.entry(payer).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(DepositError::Overflow)?;
        Ok(())
    }

    /// Returns the spendable balance of `payer`, or 0.
    pub fn balance_of(&self, payer: &Address) -> u64 {
        self.balances.get(payer).copied().unwrap_or(0)
    }

    /// Returns the deposit currently held by `record`, or 0.
    pub fn deposit_of(&self, record: &Address) -> u64 {
        self.deposits.get(record).copied().unwrap_or(0)
    }

    /// Moves `amount` motes from the payer's spendable balance into the
    /// record's deposit.
    pub fn fund_deposit(
        &mut self,
        payer: &Address,
        record: Address,
        amount: u64,
    ) -> Result<(), DepositError> {
        let balance = self.balances.get_mut(payer).ok_or(
            DepositError::InsufficientBalance {
                balance: 0,
                required: amount,
            },
        )?;
        if *balance < amount {
            return Err(DepositError::InsufficientBalance {
                balance: *balance,
                required: amount,
            });
        }
        *balance -= amount;

        let deposit = self.deposits.entry(record).or_insert(0);
        *deposit = deposit.checked_add(amount).ok_or(DepositError::Overflow)?;
        Ok(())
    }

    /// Tops the record's deposit up to at least `required`, debiting the
    /// payer for the shortfall. A fully-funded record debits nothing —
    /// this is what makes retried mints cheap.
    pub fn top_up(
        &mut self,
        payer: &Address,
        record: Address,
        required: u64,
    ) -> Result<u64, DepositError> {
        let current = self.deposit_of(&record);
        if current >= required {
            return Ok(0);
        }
        let shortfall = required - current;
        self.fund_deposit(payer, record, shortfall)?;
        Ok(shortfall)
    }
}
