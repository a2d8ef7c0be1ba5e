//! xykpool CLI - host for a single constant product pool
//!
//! Owns one pool deployment plus its in-memory ledger, persisted as a JSON
//! state file. Each invocation is one serialized operation: load state,
//! run the operation, save state. A failed operation returns before the
//! save, so the on-disk state never reflects a partial call.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod store;

use store::HostState;

#[derive(Parser)]
#[command(name = "xykpool")]
#[command(about = "Single-pool constant product AMM host", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON state file holding the pool and its ledger
    #[arg(short, long, default_value = "pool.json")]
    state: PathBuf,

    /// Verbose output (engine debug logs)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    NativeToToken,
    TokenToNative,
}

#[derive(Subcommand)]
enum Commands {
    /// Show pool reserves, shares, and ledger custody
    Status,

    /// Seed an account with native value and tokens
    Fund {
        #[arg(long)]
        account: String,

        /// Native value to credit
        #[arg(long, default_value_t = 0)]
        native: u128,

        /// Tokens to credit
        #[arg(long, default_value_t = 0)]
        token: u128,
    },

    /// Authorize the pool to pull tokens from an account
    Approve {
        #[arg(long)]
        owner: String,

        #[arg(long)]
        amount: u128,
    },

    /// One-time pool initialization
    Init {
        #[arg(long)]
        caller: String,

        /// Native amount to seed (also fixes the share-unit scale)
        #[arg(long)]
        native: u128,

        /// Token amount pulled from the caller
        #[arg(long)]
        token: u128,
    },

    /// Price a swap without executing it
    Quote {
        #[arg(long)]
        amount: u128,

        #[arg(long, value_enum, default_value = "native-to-token")]
        direction: Direction,

        /// Treat `amount` as the desired output and quote the required input
        #[arg(long)]
        exact_out: bool,
    },

    /// Execute a swap
    Swap {
        #[arg(long)]
        caller: String,

        #[arg(long)]
        amount: u128,

        #[arg(long, value_enum)]
        direction: Direction,
    },

    /// Add liquidity at the current reserve ratio
    Deposit {
        #[arg(long)]
        caller: String,

        /// Native amount; the matching token amount is pulled automatically
        #[arg(long)]
        native: u128,
    },

    /// Burn shares for a proportional payout of both reserves
    Withdraw {
        #[arg(long)]
        caller: String,

        #[arg(long)]
        shares: u128,
    },

    /// Show a provider's share balance
    Liquidity {
        #[arg(long)]
        provider: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let mut state = HostState::load(&cli.state)?;

    match cli.command {
        Commands::Status => commands::status(&state)?,
        Commands::Fund {
            account,
            native,
            token,
        } => commands::fund(&mut state, &account, native, token)?,
        Commands::Approve { owner, amount } => commands::approve(&mut state, &owner, amount)?,
        Commands::Init {
            caller,
            native,
            token,
        } => commands::init(&mut state, &caller, native, token)?,
        Commands::Quote {
            amount,
            direction,
            exact_out,
        } => commands::quote(&state, amount, direction, exact_out)?,
        Commands::Swap {
            caller,
            amount,
            direction,
        } => commands::swap(&mut state, &caller, amount, direction)?,
        Commands::Deposit { caller, native } => commands::deposit(&mut state, &caller, native)?,
        Commands::Withdraw { caller, shares } => commands::withdraw(&mut state, &caller, shares)?,
        Commands::Liquidity { provider } => commands::liquidity(&state, &provider)?,
    }

    state.save(&cli.state)?;
    Ok(())
}
