//! Pool Model - Pure constant product math (x·y=k) for a single-pair pool
//!
//! This crate contains the core constant product pricing formulas used by
//! the pool engine. It is deliberately dependency-free and `no_std` so the
//! math can be reused and checked in isolation from any host environment.
//!
//! **Zero Duplication**: the production `pool_engine` crate imports these
//! functions directly; there is no second copy of the pricing formula.

#![no_std]
#![forbid(unsafe_code)]

pub mod math;

pub use math::{mul_div, quote, quote_exact_output};

/// Fee numerator: input amounts are scaled by 997/1000 (0.3% trading fee).
pub const FEE_NUMERATOR: u128 = 997;

/// Fee denominator.
pub const FEE_DENOMINATOR: u128 = 1000;

/// Error types for pricing math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Input-side reserve is zero (pool not initialized or caller error)
    ZeroReserve,
    /// Division by a zero denominator
    ZeroDenominator,
    /// Requested output meets or exceeds the output-side reserve
    InsufficientReserve,
    /// Arithmetic overflow in an intermediate product
    Overflow,
}
