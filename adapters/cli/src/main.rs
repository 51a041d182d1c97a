#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for running Tilestep levels headlessly and managing
//! level files.

mod config;
mod level_transfer;
mod simulate;

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tilestep_core::{LevelData, TileKind};
use tilestep_world::{demo_level, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::CliConfig,
    simulate::{input_from, HeldAction},
};

/// Command-line arguments accepted by the Tilestep executable.
#[derive(Debug, Parser)]
#[command(name = "tilestep", version, about = "Tilestep platformer tools")]
struct CliArgs {
    /// Optional TOML config file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter directive, overriding the config file.
    #[arg(long, value_name = "FILTER", global = true)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs the simulation without a window and prints a summary.
    Simulate {
        /// Level file to run; falls back to the demo layout when unreadable.
        #[arg(long, value_name = "PATH")]
        level: Option<PathBuf>,
        /// Number of steps to simulate.
        #[arg(long)]
        steps: Option<u32>,
        /// Length of each step in milliseconds.
        #[arg(long, value_name = "MS")]
        step_ms: Option<u64>,
        /// Action held down for every step; repeat to hold several.
        #[arg(long, value_enum)]
        hold: Vec<HeldAction>,
    },
    /// Prints the header, tile counts and spawns of a level file.
    Inspect {
        /// Level file to read.
        path: PathBuf,
    },
    /// Writes the built-in demo layout to a level file.
    Demo {
        /// Destination file.
        path: PathBuf,
    },
    /// Rewrites a level file of any supported version in the current format.
    Upgrade {
        /// Level file to read.
        input: PathBuf,
        /// Destination file.
        output: PathBuf,
    },
    /// Prints a level as a single-line share string.
    Export {
        /// Level file to read.
        path: PathBuf,
    },
    /// Writes a level file from a share string.
    Import {
        /// Share string produced by `export`.
        encoded: String,
        /// Destination file.
        output: PathBuf,
    },
}

/// Entry point for the Tilestep command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = CliConfig::load(args.config.as_deref())?;
    init_tracing(args.log_filter.as_deref().unwrap_or(config.log_filter()))?;

    match args.command {
        CliCommand::Simulate {
            level,
            steps,
            step_ms,
            hold,
        } => {
            let mut world = match level.or(config.default_level) {
                Some(path) => World::load_level_or_demo(&path),
                None => World::new(),
            };
            let steps = steps.unwrap_or(config.steps);
            let dt = Duration::from_millis(step_ms.unwrap_or(config.fixed_step_ms));
            info!(steps, step_ms = dt.as_millis() as u64, "simulating");
            let report = simulate::run(&mut world, steps, dt, input_from(&hold));
            println!("{report}");
        }
        CliCommand::Inspect { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read level at {}", path.display()))?;
            let header = tilestep_level::read_header(&bytes)
                .with_context(|| format!("{} is not a level file", path.display()))?;
            let level = tilestep_level::decode(&bytes)
                .with_context(|| format!("failed to decode level at {}", path.display()))?;
            println!("format version: {}", header.version);
            print_summary(&level);
        }
        CliCommand::Demo { path } => {
            tilestep_level::save_file(&path, &demo_level())
                .with_context(|| format!("failed to write demo level to {}", path.display()))?;
            println!("wrote demo level to {}", path.display());
        }
        CliCommand::Upgrade { input, output } => {
            let level = tilestep_level::load_file(&input)
                .with_context(|| format!("failed to load level at {}", input.display()))?;
            tilestep_level::save_file(&output, &level)
                .with_context(|| format!("failed to write level to {}", output.display()))?;
            println!(
                "upgraded {} to version {} at {}",
                input.display(),
                tilestep_level::CURRENT_VERSION,
                output.display()
            );
        }
        CliCommand::Export { path } => {
            let level = tilestep_level::load_file(&path)
                .with_context(|| format!("failed to load level at {}", path.display()))?;
            println!("{}", level_transfer::encode(&level)?);
        }
        CliCommand::Import { encoded, output } => {
            let level = level_transfer::decode(&encoded).context("invalid level string")?;
            tilestep_level::save_file(&output, &level)
                .with_context(|| format!("failed to write level to {}", output.display()))?;
            println!("wrote {}x{} level to {}", level.columns, level.rows, output.display());
        }
    }

    Ok(())
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .with_context(|| format!("invalid log filter '{fallback}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!(error))
}

fn print_summary(level: &LevelData) {
    let solid = level
        .tiles
        .iter()
        .filter(|tile| tile.kind == TileKind::Solid)
        .count();
    let platforms = level
        .tiles
        .iter()
        .filter(|tile| tile.kind == TileKind::Platform)
        .count();
    let shaped = level
        .tiles
        .iter()
        .filter(|tile| tile.kind == TileKind::Solid && tile.shape != tile.kind.default_shape())
        .count();

    println!(
        "size: {}x{} tiles of {} units",
        level.columns, level.rows, level.tile_edge
    );
    println!("tiles: {solid} solid ({shaped} shaped), {platforms} platform");
    match level.player_spawn {
        Some(spawn) => println!("player spawn: ({}, {})", spawn.x, spawn.y),
        None => println!("player spawn: unset"),
    }
    println!("enemy spawns: {}", level.enemy_spawns.len());
    for spawn in &level.enemy_spawns {
        println!(
            "  ({}, {}) type {}",
            spawn.at.x,
            spawn.at.y,
            spawn.enemy_type.get()
        );
    }
}
