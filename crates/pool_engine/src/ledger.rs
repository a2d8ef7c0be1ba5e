//! Ledger seam
//!
//! The engine never holds funds itself; custody lives in an external
//! ledger reached through the [`Ledger`] trait. Each call is atomic on its
//! own: it either fully moves the amount or returns an error having moved
//! nothing.
//!
//! Native-asset convention: outbound native value leaves pool custody via
//! [`Ledger::send`]. Inbound native value (the amount "attached" to a
//! swap, deposit, or initialize) is the host's job to place into pool
//! custody before invoking the operation, mirroring a value-carrying call.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Source account does not hold the requested amount
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Authorized pull exceeds the owner's remaining allowance
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// The ledger refused the transfer for a host-specific reason
    #[error("transfer rejected")]
    Rejected,
}

/// External custody capability for one fungible token plus native value.
pub trait Ledger {
    type AccountId;

    /// Pull `amount` tokens from `from` into `to`, consuming allowance
    /// `from` previously granted to `to`.
    ///
    /// Consumed allowance stays consumed even when the operation that
    /// pulled it later unwinds with a compensating [`Ledger::transfer`];
    /// owners re-approve as needed.
    fn transfer_from(
        &mut self,
        from: &Self::AccountId,
        to: &Self::AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Push `amount` tokens out of `from`'s custody. No allowance involved;
    /// the engine only ever passes its own pool account as `from`.
    fn transfer(
        &mut self,
        from: &Self::AccountId,
        to: &Self::AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Native value transfer.
    fn send(
        &mut self,
        from: &Self::AccountId,
        to: &Self::AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Current token custody balance of `holder`.
    fn balance_of(&self, holder: &Self::AccountId) -> u128;
}

/// Reference ledger used by the CLI host and the test suites.
///
/// Token balances, native balances, and owner→spender allowances in plain
/// maps. Absent keys hold zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InMemoryLedger<Id: Ord> {
    token: BTreeMap<Id, u128>,
    native: BTreeMap<Id, u128>,
    allowances: BTreeMap<Id, BTreeMap<Id, u128>>,
}

impl<Id: Ord + Clone> InMemoryLedger<Id> {
    pub fn new() -> Self {
        Self {
            token: BTreeMap::new(),
            native: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Seed `account` with tokens.
    pub fn fund_token(&mut self, account: &Id, amount: u128) {
        let entry = self.token.entry(account.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Seed `account` with native value.
    pub fn fund_native(&mut self, account: &Id, amount: u128) {
        let entry = self.native.entry(account.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Grant `spender` the right to pull up to `amount` tokens from
    /// `owner`. Overwrites any previous allowance.
    pub fn approve(&mut self, owner: &Id, spender: &Id, amount: u128) {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    pub fn allowance(&self, owner: &Id, spender: &Id) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn native_balance_of(&self, holder: &Id) -> u128 {
        self.native.get(holder).copied().unwrap_or(0)
    }

    fn move_between(
        book: &mut BTreeMap<Id, u128>,
        from: &Id,
        to: &Id,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let from_balance = book.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        let to_balance = book.get(to).copied().unwrap_or(0);
        let credited = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Rejected)?;
        book.insert(from.clone(), from_balance - amount);
        book.insert(to.clone(), credited);
        Ok(())
    }
}

impl<Id: Ord + Clone> Default for InMemoryLedger<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Ord + Clone> Ledger for InMemoryLedger<Id> {
    type AccountId = Id;

    fn transfer_from(&mut self, from: &Id, to: &Id, amount: u128) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, to);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        Self::move_between(&mut self.token, from, to, amount)?;
        self.allowances
            .entry(from.clone())
            .or_default()
            .insert(to.clone(), allowed - amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Id, to: &Id, amount: u128) -> Result<(), LedgerError> {
        Self::move_between(&mut self.token, from, to, amount)
    }

    fn send(&mut self, from: &Id, to: &Id, amount: u128) -> Result<(), LedgerError> {
        Self::move_between(&mut self.native, from, to, amount)
    }

    fn balance_of(&self, holder: &Id) -> u128 {
        self.token.get(holder).copied().unwrap_or(0)
    }
}
