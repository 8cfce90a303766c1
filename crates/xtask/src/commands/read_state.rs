//! Read and inspect saved worlds
//!
//! Deserializes `world_{turn}.bin` files and displays their contents.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use realm_core::{CommandState, World};
use runtime::{FileWorldRepository, WorldRepository};

use crate::dirs;

/// Read and inspect saved worlds
#[derive(Parser)]
pub struct ReadState {
    /// Turn of the save to read (defaults to the latest)
    #[arg(value_name = "TURN")]
    turn: Option<u32>,

    /// Custom save directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Check entity chains and print the world digest
    #[arg(long)]
    verify: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (calendar, entity counts, running commands)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadState {
    pub fn execute(self) -> Result<()> {
        let dir = self.dir.unwrap_or_else(dirs::save_dir);
        if !dir.exists() {
            anyhow::bail!("Save directory not found: {}", dir.display());
        }
        let repository = FileWorldRepository::new(&dir)?;

        let turn = match self.turn {
            Some(turn) => turn,
            None => *repository
                .list_turns()?
                .last()
                .with_context(|| format!("No saved worlds in {}", dir.display()))?,
        };
        let world = repository.load(turn)?.with_context(|| {
            format!(
                "No save for turn {}\n\nHint: available turns are {:?}",
                turn,
                repository.list_turns().unwrap_or_default()
            )
        })?;

        println!("{} {}", style("Save Directory:").bold().cyan(), dir.display());
        println!("{} {}", style("Turn:").bold().cyan(), turn);
        println!();

        if self.verify {
            verify(&world)?;
        }

        match self.format {
            OutputFormat::Summary => print_summary(&world),
            OutputFormat::Json => print_json(&world)?,
            OutputFormat::Debug => println!("{:#?}", world),
        }

        Ok(())
    }
}

fn verify(world: &World) -> Result<()> {
    world
        .entities
        .verify_chains()
        .context("Entity chains are inconsistent")?;
    println!("{} chains consistent", style("✓").green());
    println!(
        "{} {}",
        style("Digest:").bold().cyan(),
        hex::encode(world.digest()?)
    );
    println!();
    Ok(())
}

fn print_summary(world: &World) {
    println!("{}", style("=== World Summary ===").bold().green());
    println!();

    println!("{}", style("Calendar:").bold().yellow());
    println!("  {}", world.calendar);
    println!("  Seed: {}", world.seed());
    println!("  Days per turn: {}", world.config.month_days);
    println!();

    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for entity in world.entities.iter().filter(|e| !e.is_deleted()) {
        *by_kind.entry(entity.kind().as_str()).or_default() += 1;
    }
    println!("{}", style("Entities:").bold().yellow());
    for (kind, count) in &by_kind {
        println!("  {kind}: {count}");
    }
    println!();

    println!("{}", style("Commands:").bold().yellow());
    println!("  Pending orders: {}", world.orders.total());
    for actor in world.actors() {
        let Some(command) = world.command(actor) else {
            continue;
        };
        if matches!(command.state, CommandState::Idle) {
            continue;
        }
        println!(
            "  {actor} {:?} '{}' (wait {}, {} days in)",
            command.state, command.text, command.wait, command.days_executing
        );
    }
    println!();
}

fn print_json(world: &World) -> Result<()> {
    let json = serde_json::to_string_pretty(world).context("Failed to serialize world to JSON")?;
    println!("{}", json);
    Ok(())
}
