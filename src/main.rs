//! Berth - an in-memory container engine registry
//!
//! This is the main CLI entry point for Berth.

use anyhow::{bail, Context, Result};
use berth::config::BerthConfig;
use berth::history::{replay, CommandEntry};
use berth::registry::{Registry, Snapshot};
use berth::tui::{self, App};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Berth - container engine playground
#[derive(Parser)]
#[command(name = "berth")]
#[command(version)]
#[command(about = "In-memory container engine with Docker-style integrity rules")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration file (defaults to <config dir>/berth/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect scenarios
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommands,
    },

    /// Apply a script of docker commands and print the result
    Replay {
        /// Script file, or - for stdin
        script: String,
        /// Continue past rejected lines
        #[arg(long)]
        keep_going: bool,
    },

    /// Launch the terminal UI
    Tui,
}

#[derive(Subcommand)]
enum ScenarioCommands {
    /// List available scenarios
    List,
    /// Load a scenario and print the resulting snapshot
    Show {
        /// Scenario ID
        id: String,
    },
}

/// Replay output
#[derive(Serialize)]
struct ReplayOutput<'a> {
    snapshot: Snapshot,
    history: Vec<&'a CommandEntry>,
}

fn init_logging(cli: &Cli, config: &BerthConfig) {
    let default_level = if cli.debug {
        "debug"
    } else if matches!(cli.command, Commands::Tui) {
        "warn"
    } else {
        config.log_level.as_str()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut script = String::new();
        std::io::stdin()
            .read_to_string(&mut script)
            .context("Failed to read script from stdin")?;
        Ok(script)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config =
        BerthConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&cli, &config);

    let mut registry = Registry::from_config(&config)?;

    match cli.command {
        Commands::Scenario { command } => match command {
            ScenarioCommands::List => {
                println!(
                    "{:<16} {:<18} {:<13} {:<6} DESCRIPTION",
                    "ID", "NAME", "DIFFICULTY", "ACTIVE"
                );
                for scenario in registry.scenarios().iter() {
                    let active = registry.active_scenario() == Some(scenario.id.as_str());
                    println!(
                        "{:<16} {:<18} {:<13} {:<6} {}",
                        scenario.id,
                        scenario.name,
                        scenario.difficulty,
                        if active { "*" } else { "" },
                        scenario.description
                    );
                }
            }
            ScenarioCommands::Show { id } => {
                let snapshot = registry.load_scenario(&id)?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
        },

        Commands::Replay { script, keep_going } => {
            let content = read_script(&script)?;
            let report = replay(&mut registry, &content, keep_going)?;

            let output = ReplayOutput {
                snapshot: registry.snapshot(),
                history: registry.command_log().entries().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            for failure in &report.failures {
                eprintln!("{}", failure);
            }
            if !report.is_clean() {
                bail!(
                    "{} of {} commands rejected",
                    report.failures.len(),
                    report.failures.len() + report.applied
                );
            }
        }

        Commands::Tui => {
            tui::open_session(&mut registry, &config)?;
            let mut app = App::new(registry);
            app.run()?;
        }
    }

    Ok(())
}
