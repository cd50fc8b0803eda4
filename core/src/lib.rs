#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Proggy puzzle engine.
//!
//! This crate defines the data surface that connects the program interpreter,
//! the authoritative world, and adapters. The simulation resolves the next
//! [`Action`] from a [`Program`], submits [`Command`] values describing the
//! world mutations for one tick, and the world answers with [`Event`] values
//! that presentation collaborators use for audio and visual feedback.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

mod program;

pub use program::{
    Action, BlockKind, Condition, Instruction, InstructionLine, Program, ProgramError,
    RawInstructionLine, LISTING_INDENT_WIDTH, MAX_INDENT, MAX_REPEAT, PROGRAM_LINES,
};

/// Maximum number of resolver steps spent looking for one actionable line.
pub const RESOLVER_STEP_LIMIT: usize = 1000;

/// Hard enemies fire on ticks divisible by this period.
pub const HARD_ENEMY_PULSE_PERIOD: u64 = 2;

/// Cardinal facing directions. Indices follow the editor convention
/// `0 = up, 1 = right, 2 = down, 3 = left`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Numeric index of the direction.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Direction for the provided index, wrapping modulo four.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Direction after a right turn.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Direction after a left turn.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell one step in `direction`, or `None` when the step
    /// would leave the non-negative coordinate space.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        let Self { column, row } = self;
        match direction {
            Direction::North => row.checked_sub(1).map(|row| Self::new(column, row)),
            Direction::East => column.checked_add(1).map(|column| Self::new(column, row)),
            Direction::South => row.checked_add(1).map(|row| Self::new(column, row)),
            Direction::West => column.checked_sub(1).map(|column| Self::new(column, row)),
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` is exactly one cardinal step away.
    #[must_use]
    pub fn is_cardinally_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Behaviour class of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Patrols back and forth and dies to an adjacent pulse.
    Soft,
    /// Stationary and fires a periodic short-range pulse.
    Hard,
}

/// Line a soft enemy bounces along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatrolAxis {
    /// Left and right.
    Horizontal,
    /// Up and down.
    Vertical,
}

impl PatrolAxis {
    /// Positive direction along the axis.
    #[must_use]
    pub const fn forward(self) -> Direction {
        match self {
            Self::Horizontal => Direction::East,
            Self::Vertical => Direction::South,
        }
    }
}

/// Patrol state of a soft enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patrol {
    /// Axis fixed when the level was parsed.
    pub axis: PatrolAxis,
    /// Current heading along the axis.
    pub heading: Direction,
}

impl Patrol {
    /// Starts a patrol heading in the positive direction of `axis`.
    #[must_use]
    pub const fn along(axis: PatrolAxis) -> Self {
        Self {
            axis,
            heading: axis.forward(),
        }
    }

    /// Flips the heading without changing the axis.
    pub fn reverse(&mut self) {
        self.heading = self.heading.opposite();
    }
}

/// Stable identifier of an enemy, equal to its index in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy placement described by a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Behaviour class.
    pub kind: EnemyKind,
    /// Spawn cell.
    pub cell: CellCoord,
    /// Patrol for soft enemies, `None` for hard enemies.
    pub patrol: Option<Patrol>,
}

/// Static per-level geometry and budgets.
///
/// Levels are immutable once parsed and shared by reference by every tick of
/// a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Human readable level name.
    pub name: String,
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Wall cells.
    pub walls: BTreeSet<CellCoord>,
    /// Enemies in discovery order.
    pub enemies: Vec<EnemySpawn>,
    /// Player spawn cell.
    pub start: CellCoord,
    /// Player spawn facing.
    pub start_facing: Direction,
    /// Goal cell.
    pub exit: CellCoord,
    /// Pulse charges granted to the player.
    pub pulse_budget: u32,
    /// Defend charges granted to the player.
    pub defend_budget: u32,
}

impl Level {
    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is inside the grid and not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.walls.contains(&cell)
    }

    /// Open neighbour of `cell` in `direction`. Walls and off-grid cells yield
    /// `None`.
    #[must_use]
    pub fn open_neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.neighbor(direction).filter(|next| self.is_open(*next))
    }

    /// Reports whether the step from `cell` in `direction` hits a wall or the
    /// grid edge.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord, direction: Direction) -> bool {
        self.open_neighbor(cell, direction).is_none()
    }
}

/// Live state of the player robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Occupied cell.
    pub cell: CellCoord,
    /// Facing direction.
    pub facing: Direction,
    /// Cleared when the player is destroyed.
    pub alive: bool,
    /// Remaining pulse charges.
    pub pulses: u32,
    /// Remaining defend charges.
    pub defends: u32,
}

impl PlayerState {
    /// Spawns the player at the level start with the level budgets.
    #[must_use]
    pub fn spawn(level: &Level) -> Self {
        Self {
            cell: level.start,
            facing: level.start_facing,
            alive: true,
            pulses: level.pulse_budget,
            defends: level.defend_budget,
        }
    }
}

/// Live state of one enemy. Destroyed enemies stay in place with
/// `alive == false` so indices remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyState {
    /// Stable identifier.
    pub id: EnemyId,
    /// Behaviour class.
    pub kind: EnemyKind,
    /// Occupied cell.
    pub cell: CellCoord,
    /// Cleared when destroyed.
    pub alive: bool,
    /// Patrol for soft enemies.
    pub patrol: Option<Patrol>,
    /// Spawn cell.
    pub origin: CellCoord,
}

impl EnemyState {
    /// Creates the live state for a level spawn.
    #[must_use]
    pub const fn spawn(id: EnemyId, spawn: &EnemySpawn) -> Self {
        Self {
            id,
            kind: spawn.kind,
            cell: spawn.cell,
            alive: true,
            patrol: spawn.patrol,
            origin: spawn.cell,
        }
    }

    /// Reports whether the enemy is alive and of the provided kind.
    #[must_use]
    pub fn is_live(&self, kind: EnemyKind) -> bool {
        self.alive && self.kind == kind
    }
}

/// Transient per-tick flags read by presentation collaborators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickFlags {
    /// A living hard enemy fired this tick.
    pub hard_enemy_pulse: bool,
    /// The player fired a pulse this tick.
    pub player_pulse: bool,
    /// The player's shield is raised this tick.
    pub player_defend: bool,
    /// The player changed cells this tick.
    pub player_moved: bool,
}

/// Block-specific bookkeeping of an open control block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameState {
    /// Counted loop progress.
    For {
        /// Total iterations.
        count: u8,
        /// Completed iterations.
        iteration: u8,
    },
    /// Loop condition re-evaluated at the end of each pass.
    While {
        /// Condition guarding the loop.
        condition: Condition,
    },
    /// Conditional block entered once.
    If,
}

/// Control-flow stack frame for a block whose body is being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockFrame {
    /// Line holding the control instruction.
    pub start_line: usize,
    /// First line of the body.
    pub body_start: usize,
    /// Indentation of the control instruction.
    pub indent: u8,
    /// Block-specific state.
    pub state: FrameState,
}

impl BlockFrame {
    /// Kind of block the frame belongs to.
    #[must_use]
    pub const fn kind(&self) -> BlockKind {
        match self.state {
            FrameState::For { .. } => BlockKind::For,
            FrameState::While { .. } => BlockKind::While,
            FrameState::If => BlockKind::If,
        }
    }
}

/// Interpreter position within a program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramCursor {
    /// Line the interpreter will inspect next.
    pub ip: usize,
    /// Line most recently inspected, shown as the executing line.
    pub executing_line: Option<usize>,
    /// Currently open blocks, innermost last.
    pub stack: Vec<BlockFrame>,
}

impl ProgramCursor {
    /// Cursor positioned before the first line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves past the line whose action just executed.
    pub fn advance(&mut self) {
        self.ip = self.ip.saturating_add(1);
    }
}

/// Reason the interpreter stopped producing actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// The instruction pointer ran past the last line.
    EndOfProgram,
    /// The resolver exhausted its step budget without finding an action.
    StepLimitExceeded,
}

/// Way the player was destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Caught by a hard enemy pulse.
    HardEnemyPulse {
        /// Enemy that fired.
        enemy: EnemyId,
    },
    /// Shared a cell with an enemy.
    Collision {
        /// Enemy occupying the cell.
        enemy: EnemyId,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Clears the per-tick flags before a new tick.
    BeginTick,
    /// Applies a player action resolved from the program.
    Perform {
        /// Program line the action came from.
        line: usize,
        /// Action to apply.
        action: Action,
    },
    /// Advances the tick counter.
    AdvanceClock,
    /// Moves every living soft enemy one patrol step.
    MoveEnemies,
    /// Fires hard enemy pulses on pulse ticks.
    ResolveHardEnemyPulses,
    /// Destroys the player if it shares a cell with a living enemy.
    ResolveCollisions,
    /// Marks the run as won if the player stands on the exit.
    CheckExit,
    /// Ends the run because the program produced no further action.
    Halt {
        /// Why the program stopped.
        reason: HaltReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// An actionable line started executing.
    InstructionStarted {
        /// Program line being executed.
        line: usize,
        /// Action the line performs.
        action: Action,
    },
    /// The player stepped into a new cell.
    PlayerMoved {
        /// Cell before the move.
        from: CellCoord,
        /// Cell after the move.
        to: CellCoord,
    },
    /// A move was stopped by a wall or the grid edge.
    PlayerBlocked {
        /// Cell the player stayed in.
        at: CellCoord,
        /// Direction of the attempted step.
        facing: Direction,
    },
    /// The player rotated.
    PlayerTurned {
        /// Facing after the turn.
        facing: Direction,
    },
    /// The player idled.
    PlayerWaited,
    /// The player fired a pulse.
    PulseFired {
        /// Cell the pulse was fired from.
        origin: CellCoord,
    },
    /// A pulse was requested with no charges left.
    PulseUnavailable,
    /// An enemy was destroyed by the player's pulse.
    EnemyDestroyed {
        /// Destroyed enemy.
        enemy: EnemyId,
        /// Cell it occupied.
        cell: CellCoord,
    },
    /// The player raised the shield.
    DefendRaised,
    /// A defend was requested with no charges left.
    DefendUnavailable,
    /// The tick counter advanced.
    TimeAdvanced {
        /// New tick number.
        tick: u64,
    },
    /// A soft enemy moved along its patrol.
    EnemyMoved {
        /// Moving enemy.
        enemy: EnemyId,
        /// Cell before the move.
        from: CellCoord,
        /// Cell after the move.
        to: CellCoord,
    },
    /// A soft enemy turned around instead of moving.
    PatrolReversed {
        /// Turning enemy.
        enemy: EnemyId,
        /// New heading.
        heading: Direction,
    },
    /// Living hard enemies fired their pulse.
    HardEnemyPulsed,
    /// A hard enemy pulse hit the raised shield.
    AttackDeflected {
        /// Enemy whose pulse was blocked.
        enemy: EnemyId,
    },
    /// The player was destroyed.
    PlayerDestroyed {
        /// What destroyed the player.
        cause: DeathCause,
    },
    /// The player reached the exit.
    ExitReached {
        /// Exit cell.
        cell: CellCoord,
    },
    /// The program stopped producing actions.
    ProgramHalted {
        /// Why the program stopped.
        reason: HaltReason,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn turning_wraps_around_the_compass() {
        assert_eq!(Direction::West.clockwise(), Direction::North);
        assert_eq!(Direction::North.counter_clockwise(), Direction::West);
        assert_eq!(Direction::East.opposite(), Direction::West);
        for direction in Direction::ALL {
            assert_eq!(Direction::from_index(direction.index()), direction);
            assert_eq!(direction.clockwise().counter_clockwise(), direction);
        }
    }

    #[test]
    fn neighbor_refuses_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.neighbor(Direction::North), None);
        assert_eq!(origin.neighbor(Direction::West), None);
        assert_eq!(origin.neighbor(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(origin.neighbor(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert!(origin.is_cardinally_adjacent(CellCoord::new(1, 2)));
        assert!(!origin.is_cardinally_adjacent(CellCoord::new(2, 2)));
        assert!(!origin.is_cardinally_adjacent(origin));
    }

    #[test]
    fn level_treats_edges_as_walls() {
        let level = Level {
            name: String::from("box"),
            columns: 3,
            rows: 2,
            walls: [CellCoord::new(1, 0)].into_iter().collect(),
            enemies: Vec::new(),
            start: CellCoord::new(0, 0),
            start_facing: Direction::East,
            exit: CellCoord::new(2, 1),
            pulse_budget: 0,
            defend_budget: 0,
        };
        assert!(level.is_blocked(CellCoord::new(0, 0), Direction::East));
        assert!(level.is_blocked(CellCoord::new(0, 0), Direction::North));
        assert!(level.is_blocked(CellCoord::new(2, 1), Direction::East));
        assert_eq!(
            level.open_neighbor(CellCoord::new(0, 0), Direction::South),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn patrol_reversal_keeps_axis() {
        let mut patrol = Patrol::along(PatrolAxis::Vertical);
        assert_eq!(patrol.heading, Direction::South);
        patrol.reverse();
        assert_eq!(patrol.heading, Direction::North);
        assert_eq!(patrol.axis, PatrolAxis::Vertical);
    }

    #[test]
    fn program_round_trips_through_bincode_as_raw_lines() {
        let program = Program::from_listing(["FOR 4", "  MOVE", "WHILE !BLOCKED", "  R-TURN"])
            .expect("parse");
        assert_round_trip(&program);
    }

    #[test]
    fn cursor_round_trips_through_bincode() {
        let cursor = ProgramCursor {
            ip: 3,
            executing_line: Some(3),
            stack: vec![BlockFrame {
                start_line: 0,
                body_start: 1,
                indent: 0,
                state: FrameState::For {
                    count: 4,
                    iteration: 2,
                },
            }],
        };
        assert_round_trip(&cursor);
    }
}
