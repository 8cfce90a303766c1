//! Development tasks for the realm workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadState, Simulate};

/// Development tasks for realm
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for realm", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run turns of a scenario and print their reports
    Simulate(Simulate),

    /// Read and inspect saved worlds
    ReadState(ReadState),

    /// Clean save data and logs
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for REALM_* variables and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(cmd) => {
            let _guard = logging::init()?;
            cmd.execute()
        }
        Command::ReadState(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
