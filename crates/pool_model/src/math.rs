//! Constant product pricing (x·y=k) with a 0.3% input fee
//!
//! All amounts are `u128`. Every intermediate product uses checked
//! arithmetic and fails closed with `MathError::Overflow` rather than
//! wrapping. Division is integer (floor) division throughout; truncation
//! always rounds in the pool's favor.

use crate::{MathError, FEE_DENOMINATOR, FEE_NUMERATOR};

/// Quote the output amount for a given input amount.
///
/// This is the constant product formula solved for output given a
/// fee-adjusted input, and is the single source of truth for both swap
/// directions:
///
/// ```text
/// effective_input = input_amount * 997
/// output = (effective_input * output_reserve)
///        / (input_reserve * 1000 + effective_input)
/// ```
///
/// # Arguments
/// * `input_amount` - Raw input amount (fee not yet applied)
/// * `input_reserve` - Reserve on the input side, excluding `input_amount`
/// * `output_reserve` - Reserve on the output side
///
/// # Returns
/// * Output amount, or `MathError::ZeroReserve` if `input_reserve == 0`,
///   or `MathError::Overflow` if an intermediate product overflows
pub fn quote(
    input_amount: u128,
    input_reserve: u128,
    output_reserve: u128,
) -> Result<u128, MathError> {
    if input_reserve == 0 {
        return Err(MathError::ZeroReserve);
    }

    let effective_input = input_amount
        .checked_mul(FEE_NUMERATOR)
        .ok_or(MathError::Overflow)?;
    let numerator = effective_input
        .checked_mul(output_reserve)
        .ok_or(MathError::Overflow)?;
    let denominator = input_reserve
        .checked_mul(FEE_DENOMINATOR)
        .ok_or(MathError::Overflow)?
        .checked_add(effective_input)
        .ok_or(MathError::Overflow)?;

    // denominator > 0 because input_reserve > 0
    Ok(numerator / denominator)
}

/// Quote the input amount required to receive an exact output amount.
///
/// Inverse of [`quote`], rounded up by one unit so the pool never pays out
/// more than the invariant allows:
///
/// ```text
/// input = (input_reserve * 1000 * output)
///       / (997 * (output_reserve - output)) + 1
/// ```
///
/// # Returns
/// * Required input amount, or `MathError::InsufficientReserve` if
///   `output_amount >= output_reserve`
pub fn quote_exact_output(
    output_amount: u128,
    input_reserve: u128,
    output_reserve: u128,
) -> Result<u128, MathError> {
    if input_reserve == 0 {
        return Err(MathError::ZeroReserve);
    }
    if output_amount >= output_reserve {
        return Err(MathError::InsufficientReserve);
    }

    let numerator = input_reserve
        .checked_mul(FEE_DENOMINATOR)
        .ok_or(MathError::Overflow)?
        .checked_mul(output_amount)
        .ok_or(MathError::Overflow)?;
    let denominator = FEE_NUMERATOR
        .checked_mul(output_reserve - output_amount)
        .ok_or(MathError::Overflow)?;

    // denominator > 0 because output_amount < output_reserve
    (numerator / denominator)
        .checked_add(1)
        .ok_or(MathError::Overflow)
}

/// Checked `floor(a * b / denominator)`.
///
/// Shared by the proportional deposit/withdraw math so truncation behaves
/// identically everywhere it appears.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::ZeroDenominator);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    Ok(product / denominator)
}
