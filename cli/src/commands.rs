//! Command handlers
//!
//! Each handler runs exactly one engine operation against the loaded host
//! state and prints the outcome plus any recorded events. Inbound native
//! value is attached host-side (moved into pool custody before the call)
//! and refunded if the operation fails.

use anyhow::{anyhow, Result};
use colored::Colorize;
use pool_engine::{Ledger, PoolEvent, RecordingSink};

use crate::store::HostState;
use crate::Direction;

fn print_events(events: &RecordingSink<String>) {
    for event in &events.events {
        match event {
            PoolEvent::NativeToTokenSwap {
                caller,
                token_out,
                native_in,
            } => println!(
                "{} caller={} native_in={} token_out={}",
                "event NativeToTokenSwap".bright_magenta(),
                caller,
                native_in,
                token_out
            ),
            PoolEvent::TokenToNativeSwap {
                caller,
                token_in,
                native_out,
            } => println!(
                "{} caller={} token_in={} native_out={}",
                "event TokenToNativeSwap".bright_magenta(),
                caller,
                token_in,
                native_out
            ),
            PoolEvent::LiquidityProvided {
                caller,
                shares_minted,
                native_in,
                token_in,
            } => println!(
                "{} caller={} shares_minted={} native_in={} token_in={}",
                "event LiquidityProvided".bright_magenta(),
                caller,
                shares_minted,
                native_in,
                token_in
            ),
            PoolEvent::LiquidityRemoved {
                caller,
                shares_burned,
                token_out,
                native_out,
            } => println!(
                "{} caller={} shares_burned={} token_out={} native_out={}",
                "event LiquidityRemoved".bright_magenta(),
                caller,
                shares_burned,
                token_out,
                native_out
            ),
        }
    }
}

/// Move attached native value into pool custody before a value-carrying
/// operation.
fn attach_native(state: &mut HostState, caller: &String, amount: u128) -> Result<()> {
    let pool_id = state.pool.account().clone();
    state
        .ledger
        .send(caller, &pool_id, amount)
        .map_err(|err| anyhow!("attaching {amount} native value from {caller}: {err}"))
}

/// Return attached native value after a failed operation.
fn refund_native(state: &mut HostState, caller: &String, amount: u128) {
    let pool_id = state.pool.account().clone();
    if let Err(err) = state.ledger.send(&pool_id, caller, amount) {
        log::error!("refund of attached native value failed: {err}");
    }
}

pub fn status(state: &HostState) -> Result<()> {
    println!("{}", "=== Pool Status ===".bright_green().bold());
    println!(
        "{} {}",
        "Initialized:".bright_cyan(),
        state.pool.is_initialized()
    );
    println!(
        "{} {}",
        "Native reserve:".bright_cyan(),
        state.pool.native_reserve()
    );
    println!(
        "{} {}",
        "Token reserve:".bright_cyan(),
        state.pool.token_reserve()
    );
    println!(
        "{} {}",
        "Total shares:".bright_cyan(),
        state.pool.total_shares()
    );

    let providers: Vec<_> = state.pool.providers().collect();
    if providers.is_empty() {
        println!("\n{}", "No liquidity providers".dimmed());
    } else {
        println!("\n{}", "Providers:".bright_cyan());
        for (provider, shares) in providers {
            println!("  {} {}", provider, shares);
        }
    }
    Ok(())
}

pub fn fund(state: &mut HostState, account: &str, native: u128, token: u128) -> Result<()> {
    let account = account.to_string();
    state.ledger.fund_native(&account, native);
    state.ledger.fund_token(&account, token);
    println!("{}", "=== Fund ===".bright_green().bold());
    println!(
        "{} {} native={} token={}",
        "Credited:".bright_cyan(),
        account,
        native,
        token
    );
    Ok(())
}

pub fn approve(state: &mut HostState, owner: &str, amount: u128) -> Result<()> {
    let owner = owner.to_string();
    let pool_id = state.pool.account().clone();
    state.ledger.approve(&owner, &pool_id, amount);
    println!("{}", "=== Approve ===".bright_green().bold());
    println!(
        "{} {} may pull up to {} tokens from {}",
        "Allowance:".bright_cyan(),
        pool_id,
        amount,
        owner
    );
    Ok(())
}

pub fn init(state: &mut HostState, caller: &str, native: u128, token: u128) -> Result<()> {
    let caller = caller.to_string();
    attach_native(state, &caller, native)?;

    let mut events = RecordingSink::new();
    match state
        .pool
        .initialize(&mut state.ledger, &mut events, &caller, native, token)
    {
        Ok(total_shares) => {
            println!("{}", "=== Initialize ===".bright_green().bold());
            println!("{} {}", "Total shares:".bright_cyan(), total_shares);
            print_events(&events);
            Ok(())
        }
        Err(err) => {
            refund_native(state, &caller, native);
            Err(anyhow!("initialize failed: {err}"))
        }
    }
}

pub fn quote(state: &HostState, amount: u128, direction: Direction, exact_out: bool) -> Result<()> {
    let (input_reserve, output_reserve) = match direction {
        Direction::NativeToToken => (state.pool.native_reserve(), state.pool.token_reserve()),
        Direction::TokenToNative => (state.pool.token_reserve(), state.pool.native_reserve()),
    };

    println!("{}", "=== Quote ===".bright_green().bold());
    if exact_out {
        let required = pool_model::quote_exact_output(amount, input_reserve, output_reserve)
            .map_err(|err| anyhow!("quote failed: {err:?}"))?;
        println!(
            "{} {} in for exactly {} out",
            "Required input:".bright_cyan(),
            required,
            amount
        );
    } else {
        let out = match direction {
            Direction::NativeToToken => state.pool.quote_native_to_token(amount)?,
            Direction::TokenToNative => state.pool.quote_token_to_native(amount)?,
        };
        println!("{} {} out for {} in", "Output:".bright_cyan(), out, amount);
    }
    Ok(())
}

pub fn swap(state: &mut HostState, caller: &str, amount: u128, direction: Direction) -> Result<()> {
    let caller = caller.to_string();
    let mut events = RecordingSink::new();

    let outcome = match direction {
        Direction::NativeToToken => {
            attach_native(state, &caller, amount)?;
            match state
                .pool
                .swap_native_for_token(&mut state.ledger, &mut events, &caller, amount)
            {
                Ok(token_out) => ("Token out:", token_out),
                Err(err) => {
                    refund_native(state, &caller, amount);
                    return Err(anyhow!("swap failed: {err}"));
                }
            }
        }
        Direction::TokenToNative => {
            let native_out = state
                .pool
                .swap_token_for_native(&mut state.ledger, &mut events, &caller, amount)
                .map_err(|err| anyhow!("swap failed: {err}"))?;
            ("Native out:", native_out)
        }
    };

    println!("{}", "=== Swap ===".bright_green().bold());
    println!("{} {}", outcome.0.bright_cyan(), outcome.1);
    print_events(&events);
    Ok(())
}

pub fn deposit(state: &mut HostState, caller: &str, native: u128) -> Result<()> {
    let caller = caller.to_string();
    attach_native(state, &caller, native)?;

    let mut events = RecordingSink::new();
    match state
        .pool
        .deposit(&mut state.ledger, &mut events, &caller, native)
    {
        Ok(outcome) => {
            println!("{}", "=== Deposit ===".bright_green().bold());
            println!(
                "{} {}",
                "Tokens pulled:".bright_cyan(),
                outcome.token_required
            );
            println!(
                "{} {}",
                "Shares minted:".bright_cyan(),
                outcome.shares_minted
            );
            print_events(&events);
            Ok(())
        }
        Err(err) => {
            refund_native(state, &caller, native);
            Err(anyhow!("deposit failed: {err}"))
        }
    }
}

pub fn withdraw(state: &mut HostState, caller: &str, shares: u128) -> Result<()> {
    let caller = caller.to_string();
    let mut events = RecordingSink::new();
    let outcome = state
        .pool
        .withdraw(&mut state.ledger, &mut events, &caller, shares)
        .map_err(|err| anyhow!("withdraw failed: {err}"))?;

    println!("{}", "=== Withdraw ===".bright_green().bold());
    println!("{} {}", "Native out:".bright_cyan(), outcome.native_out);
    println!("{} {}", "Token out:".bright_cyan(), outcome.token_out);
    print_events(&events);
    Ok(())
}

pub fn liquidity(state: &HostState, provider: &str) -> Result<()> {
    let provider = provider.to_string();
    println!("{}", "=== Liquidity ===".bright_green().bold());
    println!(
        "{} {} holds {} shares",
        "Provider:".bright_cyan(),
        provider,
        state.pool.liquidity_of(&provider)
    );
    Ok(())
}
