//! Puzzle files: a level grid, resource budgets and a program listing.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use proggy_core::{Level, Program};
use proggy_world::parse_level;
use serde::Deserialize;

/// Contents of a puzzle TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct Puzzle {
    /// Level name shown in reports.
    pub(crate) name: String,
    /// Pulse charges granted to the player.
    #[serde(default)]
    pub(crate) pulses: u32,
    /// Defend charges granted to the player.
    #[serde(default)]
    pub(crate) defends: u32,
    /// Row strings using the tile alphabet `0 1 2 3 4 9`.
    pub(crate) grid: Vec<String>,
    /// Program listing, two spaces per indentation level.
    #[serde(default)]
    pub(crate) program: Vec<String>,
}

impl Puzzle {
    /// Reads and parses the puzzle stored at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read puzzle at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid puzzle {}", path.display()))
    }

    /// Parses puzzle TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse puzzle toml contents")
    }

    /// Builds the level described by the grid and budgets.
    pub(crate) fn level(&self) -> Result<Level> {
        parse_level(self.name.as_str(), self.grid.as_slice(), self.pulses, self.defends)
            .with_context(|| format!("invalid grid in puzzle `{}`", self.name))
    }

    /// Parses the program listing.
    pub(crate) fn program(&self) -> Result<Program> {
        Program::from_listing(&self.program)
            .with_context(|| format!("invalid program in puzzle `{}`", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proggy_core::{CellCoord, Instruction};

    const FIRST_STEP: &str = include_str!("../puzzles/first_step.toml");
    const SENTRY: &str = include_str!("../puzzles/sentry.toml");

    #[test]
    fn bundled_puzzles_parse() {
        let puzzle = Puzzle::parse(FIRST_STEP).expect("first step parses");
        let level = puzzle.level().expect("grid parses");
        assert_eq!(level.name, "First Step");
        assert_eq!(level.start, CellCoord::new(1, 4));
        assert_eq!(level.exit, CellCoord::new(6, 4));

        let program = puzzle.program().expect("program parses");
        assert_eq!(program.count_lines(), 3);
        assert_eq!(
            program.line(0).map(|line| line.instruction()),
            Some(Instruction::For { times: 5 })
        );

        let sentry = Puzzle::parse(SENTRY).expect("sentry parses");
        assert_eq!((sentry.pulses, sentry.defends), (1, 1));
        assert_eq!(sentry.level().expect("grid parses").enemies.len(), 2);
    }

    #[test]
    fn budgets_and_program_default_to_empty() {
        let puzzle = Puzzle::parse("name = \"bare\"\ngrid = [\"49\"]\n").expect("parses");
        assert_eq!((puzzle.pulses, puzzle.defends), (0, 0));
        assert_eq!(puzzle.program().expect("empty program"), Program::new());
    }

    #[test]
    fn reports_bad_listing_lines() {
        let puzzle = Puzzle::parse("name = \"bad\"\ngrid = [\"49\"]\nprogram = [\"JUMP\"]\n")
            .expect("parses");
        let error = puzzle.program().expect_err("unknown mnemonic");
        assert!(format!("{error:#}").contains("invalid program in puzzle `bad`"));
    }

    #[test]
    fn missing_grid_is_rejected() {
        assert!(Puzzle::parse("name = \"nogrid\"\n").is_err());
    }
}
