//! Engine error kinds
//!
//! Every precondition violation or failed external transfer aborts the
//! whole operation with one of these kinds and no observable state change.
//! Retries are the caller's responsibility.

use pool_model::MathError;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Initialize called on a pool that already has outstanding shares
    #[error("pool is already initialized")]
    AlreadyInitialized,

    /// Swap or deposit reached a pool with no outstanding shares
    #[error("pool is not initialized")]
    Uninitialized,

    /// Input amount was zero
    #[error("input amount must be greater than zero")]
    ZeroInput,

    /// Caller holds fewer shares than the requested burn
    #[error("insufficient liquidity shares")]
    InsufficientShares,

    /// An external ledger transfer was rejected
    #[error("ledger transfer failed: {0}")]
    TransferFailed(LedgerError),

    /// An intermediate product overflowed; the operation fails closed
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<LedgerError> for PoolError {
    fn from(err: LedgerError) -> Self {
        PoolError::TransferFailed(err)
    }
}

impl From<MathError> for PoolError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => PoolError::ArithmeticOverflow,
            // Zero reserves and zero share denominators are only reachable
            // before Initialize; the operations guard for them up front, so
            // this arm is a belt against caller error, not a normal path.
            MathError::ZeroReserve
            | MathError::ZeroDenominator
            | MathError::InsufficientReserve => PoolError::Uninitialized,
        }
    }
}
