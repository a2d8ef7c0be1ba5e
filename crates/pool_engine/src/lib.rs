//! Pool Engine - accounting core for a single native/token constant product pool
//!
//! One `Pool` per deployment: two reserves, a total-share counter, and a
//! per-provider share map. Five operations (initialize, two swap
//! directions, deposit, withdraw) plus a read-only liquidity query. Every
//! operation is a synchronous all-or-nothing state transition: numeric
//! effects are planned from a snapshot of pre-call state, external
//! transfers run against the [`Ledger`] seam, and only then is the planned
//! state committed and the [`PoolEvent`] recorded. Any failure leaves pool
//! accounting untouched.
//!
//! The host owns the pool instance and serializes calls; operations take
//! `&mut` on both the pool and the ledger, so re-entry from inside a
//! transfer is not expressible.

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod ledger;
pub mod ops;
pub mod state;

pub use error::PoolError;
pub use events::{EventSink, NoOpSink, PoolEvent, RecordingSink};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
pub use ops::{DepositOutcome, WithdrawOutcome};
pub use state::Pool;
