#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that checks and runs Proggy puzzle files headlessly.

mod puzzle;
mod report;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proggy_simulation::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::puzzle::Puzzle;

/// Headless runner for Proggy puzzles.
#[derive(Debug, Parser)]
#[command(name = "proggy", version, about = "Validate and run Proggy puzzle programs")]
struct Cli {
    /// Log engine decisions at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate the program of a puzzle file.
    Check {
        /// Path to the puzzle TOML file.
        puzzle: PathBuf,
    },
    /// Validate and run the program of a puzzle file, printing a tick trace.
    Run {
        /// Path to the puzzle TOML file.
        puzzle: PathBuf,
        /// Stop after this many ticks even if the run is not over.
        #[arg(long, default_value_t = 200)]
        max_ticks: u64,
        /// Preview this many enemy-only ticks before the run starts.
        #[arg(long, default_value_t = 0)]
        preview: u32,
        /// Scrub to this recorded tick after the run and print it.
        #[arg(long)]
        scrub: Option<usize>,
    },
}

/// Entry point for the Proggy command-line interface.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { puzzle } => check(Puzzle::from_path(puzzle)?),
        Commands::Run {
            puzzle,
            max_ticks,
            preview,
            scrub,
        } => run(Puzzle::from_path(puzzle)?, max_ticks, preview, scrub),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn check(puzzle: Puzzle) -> Result<ExitCode> {
    let program = puzzle.program()?;
    let errors = Simulation::validate_code(&program);
    if errors.is_empty() {
        println!("{}: ok ({} lines)", puzzle.name, program.count_lines());
        return Ok(ExitCode::SUCCESS);
    }

    for error in &errors {
        println!("line {}: {error}", error.line + 1);
    }
    Ok(ExitCode::FAILURE)
}

fn run(puzzle: Puzzle, max_ticks: u64, preview: u32, scrub: Option<usize>) -> Result<ExitCode> {
    let level = puzzle.level()?;
    let program = puzzle.program()?;
    let mut simulation = Simulation::start(level, &program)
        .with_context(|| format!("puzzle `{}` cannot start", puzzle.name))?;
    info!(puzzle = %puzzle.name, lines = program.count_lines(), "starting run");
    println!("{}", puzzle.name);

    if preview > 0 {
        for _ in 0..preview {
            let mut events = Vec::new();
            simulation.preview_tick(&mut events);
            println!("{}", report::preview_line(&simulation, &events));
        }
        simulation.reset();
    }

    while !simulation.is_done() && simulation.tick_count() < max_ticks {
        let mut events = Vec::new();
        simulation.tick(&program, &mut events);
        println!("{}", report::tick_line(&simulation, &program, &events));
    }
    println!("{}", report::outcome(&simulation, &program));

    if let Some(index) = scrub {
        let restored = simulation.scrub_to(index);
        println!("{}", report::snapshot_line(&simulation, restored));
    }

    Ok(if simulation.is_won() && !simulation.is_lost() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
