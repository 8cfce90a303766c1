//! Run a scenario through the async runtime
//!
//! Loads a scenario from the content data directory, processes a number of
//! turns and prints each turn's report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use realm_content::ContentFactory;
use realm_core::{CommandEventKind, TurnReport, World};
use runtime::{FileWorldRepository, Runtime, RuntimeConfig, WorldRepository};

use crate::dirs;

/// Run turns of a scenario
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Scenario name under `<content>/scenarios/`
    #[arg(default_value = "demo")]
    scenario: String,

    /// Number of turns to process
    #[arg(short, long, default_value = "1")]
    turns: u32,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Content data directory (defaults to the bundled data)
    #[arg(long, value_name = "DIR")]
    content: Option<PathBuf>,

    /// Save the world after every turn
    #[arg(long)]
    save: bool,

    /// Custom save directory (defaults to platform-specific location)
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// One line per turn
    Summary,
    /// Every command event
    Events,
    /// Full JSON reports
    Json,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let factory = match &self.content {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::bundled(),
        };
        let config = factory.load_config()?;
        let mut scenario = factory
            .load_scenario(&self.scenario)
            .with_context(|| format!("Failed to load scenario '{}'", self.scenario))?;
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        let world = scenario.build(config)?;

        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?
            .block_on(self.run(world))
    }

    async fn run(&self, world: World) -> Result<()> {
        let mut builder = Runtime::builder()
            .config(RuntimeConfig::from_env())
            .initial_world(world)
            .autosave(self.save);
        if self.save {
            let dir = self.save_dir.clone().unwrap_or_else(dirs::save_dir);
            let repository = FileWorldRepository::new(&dir)
                .with_context(|| format!("Failed to open save directory: {}", dir.display()))?;
            builder = builder.repository(Arc::new(repository) as Arc<dyn WorldRepository>);
        }
        let runtime = builder.build().await?;
        let handle = runtime.handle();

        for _ in 0..self.turns {
            let report = handle.run_turn().await?;
            match self.format {
                OutputFormat::Summary => print_summary(&report),
                OutputFormat::Events => print_events(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        let world = handle.query_world().await?;
        if !matches!(self.format, OutputFormat::Json) {
            println!();
            println!(
                "{} {}",
                style("Digest:").bold().cyan(),
                hex::encode(world.digest()?)
            );
            println!(
                "{} {}",
                style("Pending orders:").bold().cyan(),
                world.orders.total()
            );
        }

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }
}

fn print_summary(report: &TurnReport) {
    let failures = report
        .events
        .iter()
        .filter(|e| matches!(e.kind, CommandEventKind::ParseFailed { .. }))
        .count();
    println!(
        "{} {:>3}  started {:>3}  completed {:>3}  rejected {:>3}",
        style("turn").bold().green(),
        report.turn,
        report.start_order().len(),
        report.completions(),
        failures
    );
}

fn print_events(report: &TurnReport) {
    println!("{}", style(format!("=== Turn {} ===", report.turn)).bold().green());
    for event in &report.events {
        let actor = event
            .actor
            .map_or_else(|| "-".to_string(), |actor| actor.to_string());
        let line = format!("  day {:>2}  {:>7}  {:?}", event.day, actor, event.kind);
        match event.kind {
            CommandEventKind::ParseFailed { .. } => println!("{}", style(line).red()),
            CommandEventKind::Completed { .. } => println!("{}", style(line).green()),
            _ => println!("{line}"),
        }
    }
}
