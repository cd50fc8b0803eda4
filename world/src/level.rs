//! Level construction from the compact row-string grid encoding.
//!
//! Each character encodes one cell: `0` empty, `1` wall, `2` soft enemy,
//! `3` hard enemy, `4` player start and `9` exit.

use std::collections::BTreeSet;

use proggy_core::{CellCoord, Direction, EnemyKind, EnemySpawn, Level, Patrol, PatrolAxis};
use thiserror::Error;

const START_FACING: Direction = Direction::East;

/// Reasons a grid encoding could not be turned into a [`Level`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid has no rows or an empty first row.
    #[error("level grid is empty")]
    Empty,
    /// A row's width differs from the first row.
    #[error("row {row} has {found} cells but the grid is {expected} wide")]
    RaggedRow {
        /// Zero-based row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A character outside the tile alphabet.
    #[error("unknown tile `{tile}` at column {column}, row {row}")]
    UnknownTile {
        /// Offending character.
        tile: char,
        /// Zero-based column index.
        column: u32,
        /// Zero-based row index.
        row: u32,
    },
    /// No `4` tile.
    #[error("level has no start tile")]
    MissingStart,
    /// More than one `4` tile.
    #[error("level has a second start tile at {0:?}")]
    DuplicateStart(CellCoord),
    /// No `9` tile.
    #[error("level has no exit tile")]
    MissingExit,
    /// More than one `9` tile.
    #[error("level has a second exit tile at {0:?}")]
    DuplicateExit(CellCoord),
}

/// Parses row strings into a [`Level`] with the provided resource budgets.
///
/// Soft enemies receive their patrol axis here and start heading in the
/// positive direction of that axis. The player always starts facing east.
pub fn parse_level<S>(
    name: impl Into<String>,
    grid: &[S],
    pulse_budget: u32,
    defend_budget: u32,
) -> Result<Level, LevelError>
where
    S: AsRef<str>,
{
    let columns = grid
        .first()
        .map(|row| row.as_ref().chars().count())
        .filter(|width| *width > 0)
        .ok_or(LevelError::Empty)?;
    let columns = u32::try_from(columns).map_err(|_| LevelError::Empty)?;
    let rows = u32::try_from(grid.len()).map_err(|_| LevelError::Empty)?;

    let mut walls = BTreeSet::new();
    let mut spawns: Vec<(EnemyKind, CellCoord)> = Vec::new();
    let mut start = None;
    let mut exit = None;

    for (row, line) in (0..rows).zip(grid) {
        let line = line.as_ref();
        let found = line.chars().count() as u32;
        if found != columns {
            return Err(LevelError::RaggedRow {
                row,
                expected: columns,
                found,
            });
        }

        for (column, tile) in (0..columns).zip(line.chars()) {
            let cell = CellCoord::new(column, row);
            match tile {
                '0' => {}
                '1' => {
                    let _ = walls.insert(cell);
                }
                '2' => spawns.push((EnemyKind::Soft, cell)),
                '3' => spawns.push((EnemyKind::Hard, cell)),
                '4' => {
                    if start.replace(cell).is_some() {
                        return Err(LevelError::DuplicateStart(cell));
                    }
                }
                '9' => {
                    if exit.replace(cell).is_some() {
                        return Err(LevelError::DuplicateExit(cell));
                    }
                }
                tile => return Err(LevelError::UnknownTile { tile, column, row }),
            }
        }
    }

    let enemies = spawns
        .into_iter()
        .map(|(kind, cell)| EnemySpawn {
            kind,
            cell,
            patrol: match kind {
                EnemyKind::Soft => Some(Patrol::along(patrol_axis(&walls, cell))),
                EnemyKind::Hard => None,
            },
        })
        .collect();

    Ok(Level {
        name: name.into(),
        columns,
        rows,
        walls,
        enemies,
        start: start.ok_or(LevelError::MissingStart)?,
        start_facing: START_FACING,
        exit: exit.ok_or(LevelError::MissingExit)?,
        pulse_budget,
        defend_budget,
    })
}

/// Picks the patrol axis for a soft enemy from the walls around its spawn:
/// horizontal when a wall sits directly above or below, vertical when one sits
/// directly left or right, horizontal otherwise.
#[must_use]
pub fn patrol_axis(walls: &BTreeSet<CellCoord>, cell: CellCoord) -> PatrolAxis {
    let wall = |direction: Direction| {
        cell.neighbor(direction)
            .is_some_and(|neighbor| walls.contains(&neighbor))
    };

    if wall(Direction::North) || wall(Direction::South) {
        PatrolAxis::Horizontal
    } else if wall(Direction::West) || wall(Direction::East) {
        PatrolAxis::Vertical
    } else {
        PatrolAxis::Horizontal
    }
}
