#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Skirmish matches headlessly.

mod generate;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skirmish_core::{CellCoord, GameStatus, TeamId};
use skirmish_host::{Scenario, Session};
use skirmish_world::query;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "skirmish")]
#[command(about = "Grid tactics simulation driver", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the movement and attack ranges of a unit
    Ranges {
        /// Scenario file
        #[arg(long)]
        scenario: PathBuf,
        /// Column of the unit
        #[arg(long)]
        x: u32,
        /// Row of the unit
        #[arg(long)]
        z: u32,
    },
    /// Replay the scenario script and print the event log
    Play {
        /// Scenario file
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Print a random scenario as TOML
    Generate {
        /// Seed for the generator
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ranges { scenario, x, z } => show_ranges(&scenario, x, z),
        Commands::Play { scenario } => play(&scenario),
        Commands::Generate { seed } => {
            let text = generate::scenario(seed)
                .to_toml_string()
                .context("failed to render generated scenario")?;
            print!("{text}");
            Ok(())
        }
    }
}

fn open(path: &Path) -> Result<(Scenario, Session)> {
    let scenario =
        Scenario::load(path).with_context(|| format!("loading {}", path.display()))?;
    let session = scenario
        .clone()
        .into_session()
        .with_context(|| format!("setting up {}", path.display()))?;
    Ok((scenario, session))
}

fn show_ranges(path: &Path, x: u32, z: u32) -> Result<()> {
    let (_, mut session) = open(path)?;
    let cell = CellCoord::new(x, z);

    let Some(unit) = query::occupant(session.world(), cell) else {
        bail!("no unit stands on {cell}");
    };
    let team = query::unit(session.world(), unit)
        .map(|snapshot| snapshot.team)
        .unwrap_or(TeamId::FIRST);
    if team != query::active_team(session.world()) {
        let _ = session
            .end_turn()
            .context("handing the turn to the unit's team")?;
    }
    let _ = session
        .select_unit(x, z)
        .with_context(|| format!("selecting the unit on {cell}"))?;

    print!(
        "{}",
        render::ranges(
            session.world(),
            Some(unit),
            &session.movement_range(),
            &session.attack_range(),
        )
    );
    Ok(())
}

fn play(path: &Path) -> Result<()> {
    let (scenario, mut session) = open(path)?;

    for (index, action) in scenario.script.iter().enumerate() {
        if let Err(reason) = action.perform(&mut session) {
            warn!(step = index + 1, ?action, %reason, "scripted action failed");
            println!("step {}: {action:?} failed: {reason}", index + 1);
        }
    }

    for event in session.drain_events() {
        println!("{event:?}");
    }
    match session.game_status() {
        GameStatus::InProgress => println!(
            "in progress: turn {}, {} to act",
            query::turn_number(session.world()),
            query::active_team(session.world())
        ),
        GameStatus::Victory(team) => println!("{team} wins"),
    }
    Ok(())
}
