//! Pool operations
//!
//! Each operation is a two-phase protocol:
//!
//! 1. *Plan*: a pure function computes every numeric effect from a
//!    snapshot of pre-call state. Reserves are read strictly before the
//!    incoming amount is merged; pricing against a reserve that already
//!    contains the input is the classic off-by-input bug.
//! 2. *Transfer + commit*: external ledger calls run against the planned
//!    amounts, and only once all of them have succeeded is the planned
//!    state written back and the event recorded. The commit itself cannot
//!    fail, so no rollback path exists for it.
//!
//! Any error therefore leaves `native_reserve`, `token_reserve`,
//! `total_shares`, and every share balance exactly as they were.

use log::{debug, error};
use pool_model::{mul_div, quote};

use crate::error::PoolError;
use crate::events::{EventSink, PoolEvent};
use crate::ledger::{Ledger, LedgerError};
use crate::state::Pool;

/// Planned effects of a swap, either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    /// Quoted output amount, fee already applied.
    pub amount_out: u128,
    /// Input-side reserve after the raw input is merged.
    pub new_input_reserve: u128,
    /// Output-side reserve after paying out.
    pub new_output_reserve: u128,
}

/// Plan a swap of `amount_in` against the given pre-input reserves.
pub fn plan_swap(
    amount_in: u128,
    input_reserve: u128,
    output_reserve: u128,
) -> Result<SwapPlan, PoolError> {
    let amount_out = quote(amount_in, input_reserve, output_reserve)?;
    let new_input_reserve = input_reserve
        .checked_add(amount_in)
        .ok_or(PoolError::ArithmeticOverflow)?;
    // quote output is strictly below output_reserve, but fail closed
    // rather than trust that here.
    let new_output_reserve = output_reserve
        .checked_sub(amount_out)
        .ok_or(PoolError::ArithmeticOverflow)?;
    Ok(SwapPlan {
        amount_out,
        new_input_reserve,
        new_output_reserve,
    })
}

/// Planned effects of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositPlan {
    pub token_required: u128,
    pub shares_minted: u128,
    pub new_native_reserve: u128,
    pub new_token_reserve: u128,
    pub new_total_shares: u128,
}

/// Plan a deposit of `native_in` against pre-input state.
///
/// Both quotients floor, so truncation is applied to what the depositor
/// owes and receives, never to what the pool keeps.
pub fn plan_deposit(
    native_in: u128,
    native_reserve: u128,
    token_reserve: u128,
    total_shares: u128,
) -> Result<DepositPlan, PoolError> {
    let token_required = mul_div(native_in, token_reserve, native_reserve)?;
    let shares_minted = mul_div(native_in, total_shares, native_reserve)?;
    let new_native_reserve = native_reserve
        .checked_add(native_in)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let new_token_reserve = token_reserve
        .checked_add(token_required)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let new_total_shares = total_shares
        .checked_add(shares_minted)
        .ok_or(PoolError::ArithmeticOverflow)?;
    Ok(DepositPlan {
        token_required,
        shares_minted,
        new_native_reserve,
        new_token_reserve,
        new_total_shares,
    })
}

/// Planned effects of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawPlan {
    pub native_out: u128,
    pub token_out: u128,
    pub new_native_reserve: u128,
    pub new_token_reserve: u128,
    pub new_total_shares: u128,
}

/// Plan burning `shares_burned` for a proportional payout of both reserves.
pub fn plan_withdraw(
    shares_burned: u128,
    native_reserve: u128,
    token_reserve: u128,
    total_shares: u128,
) -> Result<WithdrawPlan, PoolError> {
    let native_out = mul_div(shares_burned, native_reserve, total_shares)?;
    let token_out = mul_div(shares_burned, token_reserve, total_shares)?;
    // Floored payouts cannot exceed the reserves, and the caller's share
    // check bounds shares_burned <= total_shares.
    Ok(WithdrawPlan {
        native_out,
        token_out,
        new_native_reserve: native_reserve - native_out,
        new_token_reserve: token_reserve - token_out,
        new_total_shares: total_shares - shares_burned,
    })
}

/// What a successful deposit moved and minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositOutcome {
    pub token_required: u128,
    pub shares_minted: u128,
}

/// What a successful withdrawal paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawOutcome {
    pub native_out: u128,
    pub token_out: u128,
}

impl<Id: Ord + Clone> Pool<Id> {
    /// One-time initialization: seed both reserves and fix the share-unit
    /// scale at 1:1 with the native amount.
    ///
    /// The host must have placed `native_amount` of native value into pool
    /// custody before the call (attached value); `token_amount` is pulled
    /// through the ledger here. Token custody is then read back from the
    /// ledger once, making the ledger the source of truth at this
    /// boundary; afterwards the tracked counters are authoritative.
    ///
    /// Returns the minted `total_shares`, all credited to `caller`.
    pub fn initialize<L, S>(
        &mut self,
        ledger: &mut L,
        events: &mut S,
        caller: &Id,
        native_amount: u128,
        token_amount: u128,
    ) -> Result<u128, PoolError>
    where
        L: Ledger<AccountId = Id>,
        S: EventSink<Id>,
    {
        if self.total_shares != 0 {
            return Err(PoolError::AlreadyInitialized);
        }
        // Both sides must be funded: every later operation assumes nonzero
        // reserves, and a zero-token pool would price all swaps at zero.
        if native_amount == 0 || token_amount == 0 {
            return Err(PoolError::ZeroInput);
        }

        ledger.transfer_from(caller, &self.account, token_amount)?;
        let token_reserve = ledger.balance_of(&self.account);

        self.native_reserve = native_amount;
        self.token_reserve = token_reserve;
        self.total_shares = native_amount;
        self.shares.insert(caller.clone(), native_amount);
        self.debug_assert_conserved();
        debug!(
            "initialize: native_reserve={} token_reserve={} total_shares={}",
            self.native_reserve, self.token_reserve, self.total_shares
        );

        events.record(PoolEvent::LiquidityProvided {
            caller: caller.clone(),
            shares_minted: native_amount,
            native_in: native_amount,
            // The reconciled reserve, not the pulled amount: tokens already
            // parked in custody back the minted shares too.
            token_in: token_reserve,
        });
        Ok(self.total_shares)
    }

    /// Swap `native_in` native value (already placed into custody by the
    /// host) for tokens paid out through the ledger.
    pub fn swap_native_for_token<L, S>(
        &mut self,
        ledger: &mut L,
        events: &mut S,
        caller: &Id,
        native_in: u128,
    ) -> Result<u128, PoolError>
    where
        L: Ledger<AccountId = Id>,
        S: EventSink<Id>,
    {
        if native_in == 0 {
            return Err(PoolError::ZeroInput);
        }
        if !self.is_initialized() {
            return Err(PoolError::Uninitialized);
        }

        let plan = plan_swap(native_in, self.native_reserve, self.token_reserve)?;
        ledger.transfer(&self.account, caller, plan.amount_out)?;

        self.native_reserve = plan.new_input_reserve;
        self.token_reserve = plan.new_output_reserve;
        self.debug_assert_conserved();
        debug!(
            "swap native->token: native_in={} token_out={}",
            native_in, plan.amount_out
        );

        events.record(PoolEvent::NativeToTokenSwap {
            caller: caller.clone(),
            token_out: plan.amount_out,
            native_in,
        });
        Ok(plan.amount_out)
    }

    /// Swap `token_in` tokens (pulled through the ledger) for native value
    /// paid out via `send`.
    pub fn swap_token_for_native<L, S>(
        &mut self,
        ledger: &mut L,
        events: &mut S,
        caller: &Id,
        token_in: u128,
    ) -> Result<u128, PoolError>
    where
        L: Ledger<AccountId = Id>,
        S: EventSink<Id>,
    {
        if token_in == 0 {
            return Err(PoolError::ZeroInput);
        }
        if !self.is_initialized() {
            return Err(PoolError::Uninitialized);
        }

        let plan = plan_swap(token_in, self.token_reserve, self.native_reserve)?;
        ledger.transfer_from(caller, &self.account, token_in)?;
        if let Err(err) = ledger.send(&self.account, caller, plan.amount_out) {
            // Undo the pull so a rejected native leg leaves the ledger
            // whole as well as the pool.
            if let Err(refund_err) = ledger.transfer(&self.account, caller, token_in) {
                error!("token refund failed after rejected native send: {refund_err}");
            }
            return Err(PoolError::TransferFailed(err));
        }

        self.token_reserve = plan.new_input_reserve;
        self.native_reserve = plan.new_output_reserve;
        self.debug_assert_conserved();
        debug!(
            "swap token->native: token_in={} native_out={}",
            token_in, plan.amount_out
        );

        events.record(PoolEvent::TokenToNativeSwap {
            caller: caller.clone(),
            token_in,
            native_out: plan.amount_out,
        });
        Ok(plan.amount_out)
    }

    /// Add liquidity at the current reserve ratio.
    ///
    /// `native_in` is attached value; the matching token amount is
    /// computed from pre-input reserves and pulled through the ledger.
    pub fn deposit<L, S>(
        &mut self,
        ledger: &mut L,
        events: &mut S,
        caller: &Id,
        native_in: u128,
    ) -> Result<DepositOutcome, PoolError>
    where
        L: Ledger<AccountId = Id>,
        S: EventSink<Id>,
    {
        if native_in == 0 {
            return Err(PoolError::ZeroInput);
        }
        if !self.is_initialized() || self.native_reserve == 0 {
            return Err(PoolError::Uninitialized);
        }

        let plan = plan_deposit(
            native_in,
            self.native_reserve,
            self.token_reserve,
            self.total_shares,
        )?;
        let caller_shares = self
            .liquidity_of(caller)
            .checked_add(plan.shares_minted)
            .ok_or(PoolError::ArithmeticOverflow)?;

        ledger.transfer_from(caller, &self.account, plan.token_required)?;

        self.native_reserve = plan.new_native_reserve;
        self.token_reserve = plan.new_token_reserve;
        self.total_shares = plan.new_total_shares;
        if caller_shares > 0 {
            self.shares.insert(caller.clone(), caller_shares);
        }
        self.debug_assert_conserved();
        debug!(
            "deposit: native_in={} token_required={} shares_minted={}",
            native_in, plan.token_required, plan.shares_minted
        );

        events.record(PoolEvent::LiquidityProvided {
            caller: caller.clone(),
            shares_minted: plan.shares_minted,
            native_in,
            token_in: plan.token_required,
        });
        Ok(DepositOutcome {
            token_required: plan.token_required,
            shares_minted: plan.shares_minted,
        })
    }

    /// Burn `shares_burned` of the caller's shares for a proportional
    /// payout of both reserves.
    ///
    /// Two outbound legs must both land; token custody is pre-flighted
    /// before either executes, a token leg rejected after the native leg
    /// was paid is unwound by clawing the native payout back, and pool
    /// accounting commits only after both legs return Ok.
    pub fn withdraw<L, S>(
        &mut self,
        ledger: &mut L,
        events: &mut S,
        caller: &Id,
        shares_burned: u128,
    ) -> Result<WithdrawOutcome, PoolError>
    where
        L: Ledger<AccountId = Id>,
        S: EventSink<Id>,
    {
        if shares_burned == 0 {
            return Err(PoolError::ZeroInput);
        }
        let held = self.liquidity_of(caller);
        if held < shares_burned {
            return Err(PoolError::InsufficientShares);
        }

        let plan = plan_withdraw(
            shares_burned,
            self.native_reserve,
            self.token_reserve,
            self.total_shares,
        )?;

        if ledger.balance_of(&self.account) < plan.token_out {
            return Err(PoolError::TransferFailed(LedgerError::InsufficientBalance));
        }
        ledger.send(&self.account, caller, plan.native_out)?;
        if let Err(err) = ledger.transfer(&self.account, caller, plan.token_out) {
            // Claw the native payout back so neither leg lands; the shares
            // were never burned, so the caller must not keep the payout.
            if let Err(clawback_err) = ledger.send(caller, &self.account, plan.native_out) {
                error!("native clawback failed after rejected token payout: {clawback_err}");
            }
            return Err(PoolError::TransferFailed(err));
        }

        self.native_reserve = plan.new_native_reserve;
        self.token_reserve = plan.new_token_reserve;
        self.total_shares = plan.new_total_shares;
        let remaining = held - shares_burned;
        if remaining == 0 {
            self.shares.remove(caller);
        } else {
            self.shares.insert(caller.clone(), remaining);
        }
        self.debug_assert_conserved();
        debug!(
            "withdraw: shares_burned={} native_out={} token_out={}",
            shares_burned, plan.native_out, plan.token_out
        );

        events.record(PoolEvent::LiquidityRemoved {
            caller: caller.clone(),
            shares_burned,
            token_out: plan.token_out,
            native_out: plan.native_out,
        });
        Ok(WithdrawOutcome {
            native_out: plan.native_out,
            token_out: plan.token_out,
        })
    }

    /// Price a native→token swap without executing it.
    pub fn quote_native_to_token(&self, native_in: u128) -> Result<u128, PoolError> {
        if !self.is_initialized() {
            return Err(PoolError::Uninitialized);
        }
        Ok(quote(native_in, self.native_reserve, self.token_reserve)?)
    }

    /// Price a token→native swap without executing it.
    pub fn quote_token_to_native(&self, token_in: u128) -> Result<u128, PoolError> {
        if !self.is_initialized() {
            return Err(PoolError::Uninitialized);
        }
        Ok(quote(token_in, self.token_reserve, self.native_reserve)?)
    }
}
