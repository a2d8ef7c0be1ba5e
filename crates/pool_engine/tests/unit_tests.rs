//! Fast unit tests for the pool engine
//! Run with: cargo test -p pool_engine

use pool_engine::*;

const POOL: &str = "pool";
const ALICE: &str = "alice";
const BOB: &str = "bob";

/// Pool plus a funded in-memory ledger with allowances already granted.
fn setup() -> (Pool<&'static str>, InMemoryLedger<&'static str>) {
    let pool = Pool::new(POOL);
    let mut ledger = InMemoryLedger::new();
    for who in [ALICE, BOB] {
        ledger.fund_token(&who, 1_000_000);
        ledger.fund_native(&who, 1_000_000);
        ledger.approve(&who, &POOL, 1_000_000);
    }
    (pool, ledger)
}

/// Host-side attached value: move native into pool custody before a
/// value-carrying operation.
fn attach_native(ledger: &mut InMemoryLedger<&'static str>, from: &'static str, amount: u128) {
    ledger.send(&from, &POOL, amount).unwrap();
}

fn initialized_pool() -> (Pool<&'static str>, InMemoryLedger<&'static str>) {
    let (mut pool, mut ledger) = setup();
    attach_native(&mut ledger, ALICE, 1000);
    pool.initialize(&mut ledger, &mut NoOpSink, &ALICE, 1000, 1000)
        .unwrap();
    (pool, ledger)
}

#[test]
fn test_initialize_scenario() {
    let (mut pool, mut ledger) = setup();
    let mut events = RecordingSink::new();

    attach_native(&mut ledger, ALICE, 1000);
    let minted = pool
        .initialize(&mut ledger, &mut events, &ALICE, 1000, 1000)
        .unwrap();

    assert_eq!(minted, 1000);
    assert_eq!(pool.total_shares(), 1000);
    assert_eq!(pool.liquidity_of(&ALICE), 1000);
    assert_eq!(pool.native_reserve(), 1000);
    assert_eq!(pool.token_reserve(), 1000);
    assert_eq!(ledger.balance_of(&POOL), 1000);
    assert_eq!(ledger.native_balance_of(&POOL), 1000);
    assert_eq!(
        events.events,
        vec![PoolEvent::LiquidityProvided {
            caller: ALICE,
            shares_minted: 1000,
            native_in: 1000,
            token_in: 1000,
        }]
    );
}

#[test]
fn test_initialize_reports_reconciled_token_reserve() {
    let (mut pool, mut ledger) = setup();
    // Tokens parked in custody before initialization back the shares too
    ledger.fund_token(&POOL, 25);
    let mut events = RecordingSink::new();

    attach_native(&mut ledger, ALICE, 1000);
    pool.initialize(&mut ledger, &mut events, &ALICE, 1000, 1000)
        .unwrap();

    assert_eq!(pool.token_reserve(), 1025);
    assert_eq!(
        events.events,
        vec![PoolEvent::LiquidityProvided {
            caller: ALICE,
            shares_minted: 1000,
            native_in: 1000,
            token_in: 1025,
        }]
    );
}

#[test]
fn test_initialize_twice_fails_and_preserves_state() {
    let (mut pool, mut ledger) = initialized_pool();
    let snapshot = (pool.clone(), ledger.clone());

    let result = pool.initialize(&mut ledger, &mut NoOpSink, &BOB, 500, 500);

    assert_eq!(result, Err(PoolError::AlreadyInitialized));
    assert_eq!((pool, ledger), snapshot);
}

#[test]
fn test_initialize_zero_amounts_rejected() {
    let (mut pool, mut ledger) = setup();
    assert_eq!(
        pool.initialize(&mut ledger, &mut NoOpSink, &ALICE, 0, 1000),
        Err(PoolError::ZeroInput)
    );
    assert_eq!(
        pool.initialize(&mut ledger, &mut NoOpSink, &ALICE, 1000, 0),
        Err(PoolError::ZeroInput)
    );
    assert!(!pool.is_initialized());
}

#[test]
fn test_initialize_transfer_failure_rolls_back() {
    let (mut pool, mut ledger) = setup();
    ledger.approve(&ALICE, &POOL, 0); // revoke
    let snapshot = pool.clone();

    let result = pool.initialize(&mut ledger, &mut NoOpSink, &ALICE, 1000, 1000);

    assert_eq!(
        result,
        Err(PoolError::TransferFailed(LedgerError::InsufficientAllowance))
    );
    assert_eq!(pool, snapshot);
}

#[test]
fn test_swap_native_for_token_scenario() {
    let (mut pool, mut ledger) = initialized_pool();
    let mut events = RecordingSink::new();
    let bob_tokens_before = ledger.balance_of(&BOB);

    attach_native(&mut ledger, BOB, 100);
    let token_out = pool
        .swap_native_for_token(&mut ledger, &mut events, &BOB, 100)
        .unwrap();

    // floor(100*997*1000 / (1000*1000 + 100*997)) = 90
    assert_eq!(token_out, 90);
    assert_eq!(pool.native_reserve(), 1100);
    assert_eq!(pool.token_reserve(), 910);
    assert_eq!(pool.total_shares(), 1000);
    assert_eq!(ledger.balance_of(&BOB), bob_tokens_before + 90);
    assert_eq!(ledger.balance_of(&POOL), 910);
    assert_eq!(
        events.events,
        vec![PoolEvent::NativeToTokenSwap {
            caller: BOB,
            token_out: 90,
            native_in: 100,
        }]
    );
}

#[test]
fn test_swap_token_for_native_symmetric() {
    let (mut pool, mut ledger) = initialized_pool();
    let mut events = RecordingSink::new();
    let bob_native_before = ledger.native_balance_of(&BOB);

    let native_out = pool
        .swap_token_for_native(&mut ledger, &mut events, &BOB, 100)
        .unwrap();

    // Same formula with reserve roles swapped
    assert_eq!(native_out, 90);
    assert_eq!(pool.token_reserve(), 1100);
    assert_eq!(pool.native_reserve(), 910);
    assert_eq!(ledger.native_balance_of(&BOB), bob_native_before + 90);
    assert_eq!(
        events.events,
        vec![PoolEvent::TokenToNativeSwap {
            caller: BOB,
            token_in: 100,
            native_out: 90,
        }]
    );
}

#[test]
fn test_swap_grows_invariant() {
    let (mut pool, mut ledger) = initialized_pool();
    let k_before = pool.constant_product().unwrap();

    attach_native(&mut ledger, BOB, 100);
    pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 100)
        .unwrap();

    assert!(pool.constant_product().unwrap() > k_before);
}

#[test]
fn test_swap_zero_input_rejected() {
    let (mut pool, mut ledger) = initialized_pool();
    assert_eq!(
        pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 0),
        Err(PoolError::ZeroInput)
    );
    assert_eq!(
        pool.swap_token_for_native(&mut ledger, &mut NoOpSink, &BOB, 0),
        Err(PoolError::ZeroInput)
    );
}

#[test]
fn test_swap_uninitialized_rejected() {
    let (mut pool, mut ledger) = setup();
    assert_eq!(
        pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 100),
        Err(PoolError::Uninitialized)
    );
    assert_eq!(
        pool.swap_token_for_native(&mut ledger, &mut NoOpSink, &BOB, 100),
        Err(PoolError::Uninitialized)
    );
}

#[test]
fn test_deposit_preserves_ratio() {
    let (mut pool, mut ledger) = initialized_pool();
    let mut events = RecordingSink::new();

    attach_native(&mut ledger, BOB, 100);
    let outcome = pool.deposit(&mut ledger, &mut events, &BOB, 100).unwrap();

    assert_eq!(outcome.token_required, 100); // floor(100*1000/1000)
    assert_eq!(outcome.shares_minted, 100);
    assert_eq!(pool.native_reserve(), 1100);
    assert_eq!(pool.token_reserve(), 1100);
    assert_eq!(pool.total_shares(), 1100);
    assert_eq!(pool.liquidity_of(&BOB), 100);
    assert_eq!(pool.liquidity_of(&ALICE), 1000);
    assert_eq!(
        events.events,
        vec![PoolEvent::LiquidityProvided {
            caller: BOB,
            shares_minted: 100,
            native_in: 100,
            token_in: 100,
        }]
    );
}

#[test]
fn test_deposit_truncation_favors_pool() {
    let (mut pool, mut ledger) = initialized_pool();
    // Skew the ratio first: 1100 native / 910 token
    attach_native(&mut ledger, BOB, 100);
    pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 100)
        .unwrap();

    attach_native(&mut ledger, BOB, 7);
    let outcome = pool.deposit(&mut ledger, &mut NoOpSink, &BOB, 7).unwrap();

    // floor(7*910/1100) = 5, floor(7*1000/1100) = 6
    assert_eq!(outcome.token_required, 5);
    assert_eq!(outcome.shares_minted, 6);
    // Depositor pays at most the exact pro-rata token amount
    assert!(outcome.token_required * 1100 <= 7 * 910);
}

#[test]
fn test_deposit_transfer_failure_rolls_back() {
    let (mut pool, mut ledger) = initialized_pool();
    ledger.approve(&BOB, &POOL, 0);
    attach_native(&mut ledger, BOB, 100);
    let pool_snapshot = pool.clone();
    let ledger_snapshot = ledger.clone();

    let result = pool.deposit(&mut ledger, &mut NoOpSink, &BOB, 100);

    assert_eq!(
        result,
        Err(PoolError::TransferFailed(LedgerError::InsufficientAllowance))
    );
    assert_eq!(pool, pool_snapshot);
    assert_eq!(ledger, ledger_snapshot);
}

#[test]
fn test_withdraw_scenario() {
    // Pool with totalShares=1000, native=1100, token=910
    let (mut pool, mut ledger) = initialized_pool();
    attach_native(&mut ledger, BOB, 100);
    pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 100)
        .unwrap();
    let mut events = RecordingSink::new();

    let outcome = pool
        .withdraw(&mut ledger, &mut events, &ALICE, 500)
        .unwrap();

    assert_eq!(outcome.native_out, 550);
    assert_eq!(outcome.token_out, 455);
    assert_eq!(pool.total_shares(), 500);
    assert_eq!(pool.liquidity_of(&ALICE), 500);
    assert_eq!(pool.native_reserve(), 550);
    assert_eq!(pool.token_reserve(), 455);
    assert_eq!(ledger.balance_of(&POOL), 455);
    assert_eq!(ledger.native_balance_of(&POOL), 550);
    assert_eq!(
        events.events,
        vec![PoolEvent::LiquidityRemoved {
            caller: ALICE,
            shares_burned: 500,
            token_out: 455,
            native_out: 550,
        }]
    );
}

#[test]
fn test_withdraw_all_drains_pool() {
    let (mut pool, mut ledger) = initialized_pool();

    let outcome = pool
        .withdraw(&mut ledger, &mut NoOpSink, &ALICE, 1000)
        .unwrap();

    assert_eq!(outcome.native_out, 1000);
    assert_eq!(outcome.token_out, 1000);
    assert_eq!(pool.total_shares(), 0);
    assert_eq!(pool.liquidity_of(&ALICE), 0);
    assert!(!pool.is_initialized());
    assert_eq!(ledger.balance_of(&POOL), 0);
    assert_eq!(ledger.native_balance_of(&POOL), 0);
}

#[test]
fn test_withdraw_insufficient_shares() {
    let (mut pool, mut ledger) = initialized_pool();
    let snapshot = (pool.clone(), ledger.clone());

    assert_eq!(
        pool.withdraw(&mut ledger, &mut NoOpSink, &ALICE, 1001),
        Err(PoolError::InsufficientShares)
    );
    assert_eq!(
        pool.withdraw(&mut ledger, &mut NoOpSink, &BOB, 1),
        Err(PoolError::InsufficientShares)
    );
    assert_eq!((pool, ledger), snapshot);
}

#[test]
fn test_withdraw_zero_shares_rejected() {
    let (mut pool, mut ledger) = initialized_pool();
    assert_eq!(
        pool.withdraw(&mut ledger, &mut NoOpSink, &ALICE, 0),
        Err(PoolError::ZeroInput)
    );
}

#[test]
fn test_share_conservation_across_sequence() {
    let (mut pool, mut ledger) = initialized_pool();

    attach_native(&mut ledger, BOB, 250);
    pool.deposit(&mut ledger, &mut NoOpSink, &BOB, 250).unwrap();
    attach_native(&mut ledger, BOB, 40);
    pool.swap_native_for_token(&mut ledger, &mut NoOpSink, &BOB, 40)
        .unwrap();
    pool.withdraw(&mut ledger, &mut NoOpSink, &ALICE, 300)
        .unwrap();

    let sum: u128 = pool.providers().map(|(_, s)| s).sum();
    assert_eq!(pool.total_shares(), sum);
}

#[test]
fn test_quote_queries_match_swaps() {
    let (pool, _ledger) = initialized_pool();
    assert_eq!(pool.quote_native_to_token(100), Ok(90));
    assert_eq!(pool.quote_token_to_native(100), Ok(90));

    let empty: Pool<&'static str> = Pool::new(POOL);
    assert_eq!(
        empty.quote_native_to_token(100),
        Err(PoolError::Uninitialized)
    );
}

// ============================================================================
// Fault injection: a ledger that rejects the Nth mutating call
// ============================================================================

struct FailingLedger<'a> {
    inner: &'a mut InMemoryLedger<&'static str>,
    fail_on: u32,
    calls: u32,
}

impl<'a> FailingLedger<'a> {
    fn new(inner: &'a mut InMemoryLedger<&'static str>, fail_on: u32) -> Self {
        Self {
            inner,
            fail_on,
            calls: 0,
        }
    }

    fn tick(&mut self) -> Result<(), LedgerError> {
        self.calls += 1;
        if self.calls == self.fail_on {
            Err(LedgerError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl Ledger for FailingLedger<'_> {
    type AccountId = &'static str;

    fn transfer_from(
        &mut self,
        from: &&'static str,
        to: &&'static str,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.tick()?;
        self.inner.transfer_from(from, to, amount)
    }

    fn transfer(
        &mut self,
        from: &&'static str,
        to: &&'static str,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.tick()?;
        self.inner.transfer(from, to, amount)
    }

    fn send(
        &mut self,
        from: &&'static str,
        to: &&'static str,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.tick()?;
        self.inner.send(from, to, amount)
    }

    fn balance_of(&self, holder: &&'static str) -> u128 {
        self.inner.balance_of(holder)
    }
}

#[test]
fn test_swap_native_failing_payout_leaves_pool_unchanged() {
    let (mut pool, mut ledger) = initialized_pool();
    attach_native(&mut ledger, BOB, 100);
    let pool_snapshot = pool.clone();
    let ledger_snapshot = ledger.clone();

    let mut failing = FailingLedger::new(&mut ledger, 1); // reject the token payout
    let result = pool.swap_native_for_token(&mut failing, &mut NoOpSink, &BOB, 100);

    assert_eq!(result, Err(PoolError::TransferFailed(LedgerError::Rejected)));
    assert_eq!(pool, pool_snapshot);
    assert_eq!(ledger, ledger_snapshot);
}

#[test]
fn test_swap_token_failing_send_refunds_pull() {
    let (mut pool, mut ledger) = initialized_pool();
    let pool_snapshot = pool.clone();
    let bob_tokens = ledger.balance_of(&BOB);
    let pool_tokens = ledger.balance_of(&POOL);
    let bob_native = ledger.native_balance_of(&BOB);

    // Call 1 = transfer_from (pull), call 2 = send (native payout)
    let mut failing = FailingLedger::new(&mut ledger, 2);
    let result = pool.swap_token_for_native(&mut failing, &mut NoOpSink, &BOB, 100);

    assert_eq!(result, Err(PoolError::TransferFailed(LedgerError::Rejected)));
    assert_eq!(pool, pool_snapshot);
    // The pulled tokens were returned
    assert_eq!(ledger.balance_of(&BOB), bob_tokens);
    assert_eq!(ledger.balance_of(&POOL), pool_tokens);
    assert_eq!(ledger.native_balance_of(&BOB), bob_native);
    // Allowance consumed by the pull is not restored by the refund
    assert_eq!(ledger.allowance(&BOB, &POOL), 1_000_000 - 100);
}

#[test]
fn test_withdraw_failing_first_leg_leaves_all_state_unchanged() {
    let (mut pool, mut ledger) = initialized_pool();
    let snapshot = (pool.clone(), ledger.clone());

    // Call 1 = send (native payout)
    let mut failing = FailingLedger::new(&mut ledger, 1);
    let result = pool.withdraw(&mut failing, &mut NoOpSink, &ALICE, 500);

    assert_eq!(result, Err(PoolError::TransferFailed(LedgerError::Rejected)));
    assert_eq!((pool, ledger), snapshot);
}

#[test]
fn test_withdraw_failing_second_leg_claws_back_native_payout() {
    let (mut pool, mut ledger) = initialized_pool();
    let snapshot = (pool.clone(), ledger.clone());

    // Call 1 = send succeeds, call 2 = token payout rejected,
    // call 3 = the clawback of the native payout
    let mut failing = FailingLedger::new(&mut ledger, 2);
    let result = pool.withdraw(&mut failing, &mut NoOpSink, &ALICE, 500);

    assert_eq!(result, Err(PoolError::TransferFailed(LedgerError::Rejected)));
    // Shares were never burned, so the caller must not keep the payout:
    // pool accounting and every ledger balance are back where they started.
    assert_eq!(pool.liquidity_of(&ALICE), 1000);
    assert_eq!(ledger.native_balance_of(&ALICE), 1_000_000 - 1000);
    assert_eq!(ledger.native_balance_of(&POOL), 1000);
    assert_eq!((pool, ledger), snapshot);
}

#[test]
fn test_no_events_recorded_on_failure() {
    let (mut pool, mut ledger) = initialized_pool();
    let mut events = RecordingSink::new();

    let _ = pool.withdraw(&mut ledger, &mut events, &BOB, 10);
    let _ = pool.swap_native_for_token(&mut ledger, &mut events, &BOB, 0);

    assert!(events.events.is_empty());
}
