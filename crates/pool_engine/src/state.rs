//! Pool state
//!
//! One deployment owns exactly one `Pool`. Reserves and shares are tracked
//! internal counters; after `initialize` reconciles token custody against
//! the ledger once, the tracked counters are authoritative and pricing
//! never re-reads live balances.

use std::collections::BTreeMap;

/// Single-pair constant product pool.
///
/// `Id` is the host's notion of an account identity; the engine only
/// requires ordering (for the share map) and cloning (for events).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pool<Id: Ord> {
    /// Identity under which the ledger holds this pool's custody.
    pub(crate) account: Id,
    pub(crate) native_reserve: u128,
    pub(crate) token_reserve: u128,
    /// Sum of all outstanding liquidity shares. Zero iff uninitialized.
    pub(crate) total_shares: u128,
    /// Per-provider share balances. Absent key = zero; entries are removed
    /// when they reach zero so the map never accumulates dust keys.
    pub(crate) shares: BTreeMap<Id, u128>,
}

impl<Id: Ord + Clone> Pool<Id> {
    /// Create an uninitialized pool whose custody lives under `account`.
    pub fn new(account: Id) -> Self {
        Self {
            account,
            native_reserve: 0,
            token_reserve: 0,
            total_shares: 0,
            shares: BTreeMap::new(),
        }
    }

    pub fn account(&self) -> &Id {
        &self.account
    }

    pub fn native_reserve(&self) -> u128 {
        self.native_reserve
    }

    pub fn token_reserve(&self) -> u128 {
        self.token_reserve
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn is_initialized(&self) -> bool {
        self.total_shares > 0
    }

    /// Read-only query surface: a provider's share balance.
    pub fn liquidity_of(&self, provider: &Id) -> u128 {
        self.shares.get(provider).copied().unwrap_or(0)
    }

    /// All providers with nonzero shares, in key order.
    pub fn providers(&self) -> impl Iterator<Item = (&Id, u128)> {
        self.shares.iter().map(|(id, shares)| (id, *shares))
    }

    /// The invariant `native_reserve * token_reserve`, `None` on overflow.
    pub fn constant_product(&self) -> Option<u128> {
        self.native_reserve.checked_mul(self.token_reserve)
    }

    /// Share conservation: `total_shares == Σ shares[*]`. Checked after
    /// every commit in debug builds; the fuzz suite checks it explicitly.
    pub(crate) fn debug_assert_conserved(&self) {
        debug_assert_eq!(
            self.total_shares,
            self.shares.values().copied().fold(0u128, u128::saturating_add),
            "share conservation violated"
        );
    }
}
