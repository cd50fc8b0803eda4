#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation controller that drives a program against a live world.
//!
//! A [`Simulation`] owns the level, the live world, the interpreter cursor
//! and the snapshot history. Each [`Simulation::tick`] resolves the next
//! action through the control-flow system, applies it together with the
//! world phases and records a snapshot. [`Simulation::preview_tick`] only
//! advances the world, and [`Simulation::scrub_to`] restores any recorded
//! snapshot without re-running logic.

use proggy_core::{
    Command, EnemyState, Event, Level, PlayerState, Program, ProgramCursor, TickFlags,
};
use proggy_system_control_flow::{ControlFlow, Resolution};
use proggy_system_validator::{self as validator, Issue, ValidationError};
use proggy_world::{self as world, query, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod history;

pub use history::{HistoryBuffer, HistoryError};

/// World phases that follow the player action of a regular tick.
const TICK_PHASES: [Command; 5] = [
    Command::AdvanceClock,
    Command::MoveEnemies,
    Command::ResolveHardEnemyPulses,
    Command::ResolveCollisions,
    Command::CheckExit,
];

/// World phases of a preview tick. The player never moves, so the exit is
/// not checked.
const PREVIEW_PHASES: [Command; 4] = [
    Command::AdvanceClock,
    Command::MoveEnemies,
    Command::ResolveHardEnemyPulses,
    Command::ResolveCollisions,
];

/// Errors raised when a simulation cannot be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The program failed validation. Carries the first finding.
    #[error("line {}: {issue}", .line + 1)]
    InvalidProgram {
        /// Zero-based line index of the finding.
        line: usize,
        /// What is wrong with the line.
        issue: Issue,
    },
}

impl From<ValidationError> for SimulationError {
    fn from(error: ValidationError) -> Self {
        Self::InvalidProgram {
            line: error.line,
            issue: error.issue,
        }
    }
}

/// Self-contained copy of everything that changes during a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Live entities, clock and outcome flags.
    pub world: World,
    /// Interpreter position and open blocks.
    pub cursor: ProgramCursor,
}

/// Result of a won run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    /// Ticks spent reaching the exit.
    pub ticks: u64,
    /// Non-empty program lines.
    pub lines: usize,
}

/// One run of a program on a level.
#[derive(Clone, Debug)]
pub struct Simulation {
    level: Level,
    world: World,
    cursor: ProgramCursor,
    history: HistoryBuffer<Snapshot>,
    control_flow: ControlFlow,
}

impl Simulation {
    /// Starts a fresh run on `level` with the history seeded by the initial
    /// state.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let world = World::new(&level);
        let cursor = ProgramCursor::new();
        let history = HistoryBuffer::seeded(Snapshot {
            world: world.clone(),
            cursor: cursor.clone(),
        });
        Self {
            level,
            world,
            cursor,
            history,
            control_flow: ControlFlow::new(),
        }
    }

    /// Validates `program` and starts a run only if it has no findings.
    pub fn start(level: Level, program: &Program) -> Result<Self, SimulationError> {
        if let Some(error) = validator::first_error(program) {
            debug!(line = error.line, %error, "program rejected");
            return Err(error.into());
        }
        Ok(Self::new(level))
    }

    /// Replaces the resolver, e.g. to tighten its step budget.
    #[must_use]
    pub fn with_control_flow(mut self, control_flow: ControlFlow) -> Self {
        self.control_flow = control_flow;
        self
    }

    /// Restarts the run on the same level, discarding all history.
    pub fn reset(&mut self) {
        *self = Self::new(self.level.clone()).with_control_flow(self.control_flow);
    }

    /// Checks `program` without touching any run.
    #[must_use]
    pub fn validate_code(program: &Program) -> Vec<ValidationError> {
        validator::validate(program)
    }

    /// Executes the next action of `program` and advances the world by one
    /// tick. Does nothing once the run is over.
    ///
    /// When the program has no further action the run is marked done and a
    /// halt event is emitted, but no tick elapses and nothing is recorded.
    pub fn tick(&mut self, program: &Program, out_events: &mut Vec<Event>) {
        if query::is_done(&self.world) {
            return;
        }

        world::apply(&mut self.world, &self.level, Command::BeginTick, out_events);

        let live = &self.world;
        let level = &self.level;
        let resolution = self
            .control_flow
            .resolve(&mut self.cursor, program, |condition| {
                query::evaluate(live, level, condition)
            });

        match resolution {
            Resolution::Halted(reason) => {
                debug!(tick = query::tick(&self.world), ?reason, "program halted");
                world::apply(
                    &mut self.world,
                    &self.level,
                    Command::Halt { reason },
                    out_events,
                );
            }
            Resolution::Action { line, action } => {
                world::apply(
                    &mut self.world,
                    &self.level,
                    Command::Perform { line, action },
                    out_events,
                );
                self.cursor.advance();
                for command in TICK_PHASES {
                    world::apply(&mut self.world, &self.level, command, out_events);
                }
                self.record();
            }
        }
    }

    /// Advances the world by one tick without consuming program lines.
    /// Allowed even after the run is over.
    pub fn preview_tick(&mut self, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, &self.level, Command::BeginTick, out_events);
        for command in PREVIEW_PHASES {
            world::apply(&mut self.world, &self.level, command, out_events);
        }
        self.record();
    }

    /// Restores the snapshot at `index`, clamped to the recorded range, and
    /// returns the index actually restored.
    pub fn scrub_to(&mut self, index: usize) -> usize {
        let snapshot = self.history.scrub_to(index).clone();
        self.world = snapshot.world;
        self.cursor = snapshot.cursor;
        self.history.index()
    }

    fn record(&mut self) {
        self.history.record(Snapshot {
            world: self.world.clone(),
            cursor: self.cursor.clone(),
        });
    }

    /// Level being played.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Live world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Live interpreter cursor.
    #[must_use]
    pub fn cursor(&self) -> &ProgramCursor {
        &self.cursor
    }

    /// Live player state.
    #[must_use]
    pub fn player(&self) -> &PlayerState {
        query::player(&self.world)
    }

    /// Every enemy, destroyed ones included.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyState] {
        query::enemies(&self.world)
    }

    /// Ticks elapsed in the live state.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        query::tick(&self.world)
    }

    /// Flags raised during the latest tick.
    #[must_use]
    pub fn flags(&self) -> TickFlags {
        query::flags(&self.world)
    }

    /// Line most recently inspected by the resolver.
    #[must_use]
    pub fn executing_line(&self) -> Option<usize> {
        self.cursor.executing_line
    }

    /// Reports whether the player reached the exit.
    #[must_use]
    pub fn is_won(&self) -> bool {
        query::is_won(&self.world)
    }

    /// Reports whether the player was destroyed.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        query::is_lost(&self.world)
    }

    /// Reports whether the run is over.
    #[must_use]
    pub fn is_done(&self) -> bool {
        query::is_done(&self.world)
    }

    /// Score of a won run. A loss takes precedence over a simultaneous win.
    #[must_use]
    pub fn score(&self, program: &Program) -> Option<Score> {
        (self.is_won() && !self.is_lost()).then(|| Score {
            ticks: self.tick_count(),
            lines: program.count_lines(),
        })
    }

    /// Recorded snapshots.
    #[must_use]
    pub fn history(&self) -> &HistoryBuffer<Snapshot> {
        &self.history
    }

    /// Number of recorded snapshots.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Index of the snapshot the live state was last synchronised with.
    #[must_use]
    pub fn history_index(&self) -> usize {
        self.history.index()
    }
}
