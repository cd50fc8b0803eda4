//! Command and condition tables plus the fixed-length Program Store.
//!
//! Instructions are typed, but every value keeps an exact raw encoding
//! (`command id`, `param`, `indent`) so programs persisted by an editor decode
//! into the same semantics: FOR stores its repeat count minus one and WHILE/IF
//! store an index into the condition table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of lines available in every program.
pub const PROGRAM_LINES: usize = 20;

/// Deepest indentation level a line may carry.
pub const MAX_INDENT: u8 = 4;

/// Largest repeat count accepted by a FOR block.
pub const MAX_REPEAT: u8 = 10;

/// Number of spaces representing one indentation level in the text listing.
pub const LISTING_INDENT_WIDTH: usize = 2;

/// Tick-consuming player actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step one cell in the facing direction.
    Move,
    /// Rotate clockwise.
    TurnRight,
    /// Rotate counter-clockwise.
    TurnLeft,
    /// Spend the tick without acting.
    Wait,
    /// Destroy adjacent soft enemies, consuming one pulse charge.
    Pulse,
    /// Shield against hard enemy pulses this tick, consuming one defend charge.
    Defend,
}

/// Named world predicates usable by WHILE and IF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// The cell ahead of the player is a wall or off the grid.
    Blocked,
    /// The cell ahead of the player is open.
    NotBlocked,
    /// The cell above the player is a wall.
    WallUp,
    /// The cell below the player is a wall.
    WallDown,
    /// The cell left of the player is a wall.
    WallLeft,
    /// The cell right of the player is a wall.
    WallRight,
    /// The cell above the player is open.
    NoWallUp,
    /// The cell below the player is open.
    NoWallDown,
    /// The cell left of the player is open.
    NoWallLeft,
    /// The cell right of the player is open.
    NoWallRight,
    /// A living enemy is cardinally adjacent to the player.
    Enemy,
    /// No living enemy is cardinally adjacent to the player.
    NoEnemy,
    /// Always holds. Only WHILE may use it.
    True,
}

impl Condition {
    /// Condition table in raw id order.
    pub const ALL: [Condition; 13] = [
        Condition::Blocked,
        Condition::NotBlocked,
        Condition::WallUp,
        Condition::WallDown,
        Condition::WallLeft,
        Condition::WallRight,
        Condition::NoWallUp,
        Condition::NoWallDown,
        Condition::NoWallLeft,
        Condition::NoWallRight,
        Condition::Enemy,
        Condition::NoEnemy,
        Condition::True,
    ];

    /// Raw table index of the condition.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Blocked => 0,
            Self::NotBlocked => 1,
            Self::WallUp => 2,
            Self::WallDown => 3,
            Self::WallLeft => 4,
            Self::WallRight => 5,
            Self::NoWallUp => 6,
            Self::NoWallDown => 7,
            Self::NoWallLeft => 8,
            Self::NoWallRight => 9,
            Self::Enemy => 10,
            Self::NoEnemy => 11,
            Self::True => 12,
        }
    }

    /// Looks up a condition by raw table index.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Display name used by the editor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blocked => "BLOCKED",
            Self::NotBlocked => "!BLOCKED",
            Self::WallUp => "U-WALL",
            Self::WallDown => "D-WALL",
            Self::WallLeft => "L-WALL",
            Self::WallRight => "R-WALL",
            Self::NoWallUp => "!U-WALL",
            Self::NoWallDown => "!D-WALL",
            Self::NoWallLeft => "!L-WALL",
            Self::NoWallRight => "!R-WALL",
            Self::Enemy => "ENEMY",
            Self::NoEnemy => "!ENEMY",
            Self::True => "TRUE",
        }
    }

    /// Reports whether IF accepts the condition.
    #[must_use]
    pub const fn allowed_in_if(self) -> bool {
        !matches!(self, Self::True)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Condition {
    type Err = ProgramError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|condition| condition.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| ProgramError::UnknownConditionName(value.to_owned()))
    }
}

/// Kinds of control blocks that govern an indented body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Counted loop.
    For,
    /// Conditional loop.
    While,
    /// Single conditional entry.
    If,
}

impl BlockKind {
    /// Display name used by the editor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::For => "FOR",
            Self::While => "WHILE",
            Self::If => "IF",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry in the fixed command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Empty line, transparent to execution and block detection.
    Nop,
    /// Step forward.
    Move,
    /// Rotate clockwise.
    TurnRight,
    /// Rotate counter-clockwise.
    TurnLeft,
    /// Idle for one tick.
    Wait,
    /// Fire a pulse.
    Pulse,
    /// Raise the shield.
    Defend,
    /// Repeat the body a fixed number of times.
    For {
        /// Number of iterations, `1..=MAX_REPEAT`.
        times: u8,
    },
    /// Repeat the body while the condition holds.
    While(Condition),
    /// Enter the body once if the condition holds.
    If(Condition),
}

impl Instruction {
    /// Raw command table id.
    #[must_use]
    pub const fn command_id(self) -> u8 {
        match self {
            Self::Nop => 0,
            Self::Move => 1,
            Self::TurnRight => 2,
            Self::TurnLeft => 3,
            Self::Wait => 4,
            Self::Pulse => 5,
            Self::Defend => 6,
            Self::For { .. } => 7,
            Self::While(_) => 8,
            Self::If(_) => 9,
        }
    }

    /// Raw parameter value as stored by the editor.
    #[must_use]
    pub const fn raw_param(self) -> u8 {
        match self {
            Self::For { times } => times.saturating_sub(1),
            Self::While(condition) | Self::If(condition) => condition.id(),
            _ => 0,
        }
    }

    /// Decodes a raw command id and parameter pair.
    pub fn from_raw(command_id: u8, param: u8) -> Result<Self, ProgramError> {
        let condition = || Condition::from_id(param).ok_or(ProgramError::UnknownCondition(param));
        let instruction = match command_id {
            0 => Self::Nop,
            1 => Self::Move,
            2 => Self::TurnRight,
            3 => Self::TurnLeft,
            4 => Self::Wait,
            5 => Self::Pulse,
            6 => Self::Defend,
            7 => {
                if param >= MAX_REPEAT {
                    return Err(ProgramError::RepeatOutOfRange(param.saturating_add(1)));
                }
                Self::For { times: param + 1 }
            }
            8 => Self::While(condition()?),
            9 => Self::If(condition()?),
            other => return Err(ProgramError::UnknownCommand(other)),
        };
        Ok(instruction)
    }

    /// Display name of the command without its parameter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "---",
            Self::Move => "MOVE",
            Self::TurnRight => "R-TURN",
            Self::TurnLeft => "L-TURN",
            Self::Wait => "WAIT",
            Self::Pulse => "PULSE",
            Self::Defend => "DEFEND",
            Self::For { .. } => "FOR",
            Self::While(_) => "WHILE",
            Self::If(_) => "IF",
        }
    }

    /// Player action performed by the instruction, if it consumes a tick.
    #[must_use]
    pub const fn action(self) -> Option<Action> {
        match self {
            Self::Move => Some(Action::Move),
            Self::TurnRight => Some(Action::TurnRight),
            Self::TurnLeft => Some(Action::TurnLeft),
            Self::Wait => Some(Action::Wait),
            Self::Pulse => Some(Action::Pulse),
            Self::Defend => Some(Action::Defend),
            Self::Nop | Self::For { .. } | Self::While(_) | Self::If(_) => None,
        }
    }

    /// Block kind opened by the instruction, if it is a control command.
    #[must_use]
    pub const fn block_kind(self) -> Option<BlockKind> {
        match self {
            Self::For { .. } => Some(BlockKind::For),
            Self::While(_) => Some(BlockKind::While),
            Self::If(_) => Some(BlockKind::If),
            _ => None,
        }
    }

    /// Reports whether the line is empty.
    #[must_use]
    pub const fn is_nop(self) -> bool {
        matches!(self, Self::Nop)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::For { times } => write!(f, "FOR {times}"),
            Self::While(condition) => write!(f, "WHILE {condition}"),
            Self::If(condition) => write!(f, "IF {condition}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Instruction {
    type Err = ProgramError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();
        let Some(mnemonic) = parts.next() else {
            return Ok(Self::Nop);
        };
        let argument = parts.next();
        if let Some(extra) = parts.next() {
            return Err(ProgramError::UnexpectedArgument(extra.to_owned()));
        }

        let mnemonic = mnemonic.to_ascii_uppercase();
        let instruction = match mnemonic.as_str() {
            "---" | "NOP" => Self::Nop,
            "MOVE" => Self::Move,
            "R-TURN" => Self::TurnRight,
            "L-TURN" => Self::TurnLeft,
            "WAIT" => Self::Wait,
            "PULSE" => Self::Pulse,
            "DEFEND" => Self::Defend,
            "FOR" => {
                let raw = argument.ok_or(ProgramError::MissingArgument("FOR"))?;
                let times: u8 = raw
                    .parse()
                    .map_err(|_| ProgramError::UnexpectedArgument(raw.to_owned()))?;
                if !(1..=MAX_REPEAT).contains(&times) {
                    return Err(ProgramError::RepeatOutOfRange(times));
                }
                return Ok(Self::For { times });
            }
            "WHILE" => {
                let raw = argument.ok_or(ProgramError::MissingArgument("WHILE"))?;
                return Ok(Self::While(raw.parse()?));
            }
            "IF" => {
                let raw = argument.ok_or(ProgramError::MissingArgument("IF"))?;
                return Ok(Self::If(raw.parse()?));
            }
            _ => return Err(ProgramError::UnknownMnemonic(mnemonic)),
        };

        match argument {
            Some(extra) => Err(ProgramError::UnexpectedArgument(extra.to_owned())),
            None => Ok(instruction),
        }
    }
}

/// Raw persisted form of an instruction line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawInstructionLine {
    /// Index into the command table.
    pub cmd: u8,
    /// Command-specific parameter.
    pub param: u8,
    /// Indentation level, `0..=MAX_INDENT`.
    pub indent: u8,
}

/// Single program line: an instruction and its indentation level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInstructionLine", into = "RawInstructionLine")]
pub struct InstructionLine {
    instruction: Instruction,
    indent: u8,
}

impl InstructionLine {
    /// Empty line at indentation zero.
    pub const NOP: InstructionLine = InstructionLine {
        instruction: Instruction::Nop,
        indent: 0,
    };

    /// Creates a line, rejecting indents deeper than [`MAX_INDENT`] and
    /// repeat counts outside `1..=MAX_REPEAT`.
    pub fn new(instruction: Instruction, indent: u8) -> Result<Self, ProgramError> {
        if indent > MAX_INDENT {
            return Err(ProgramError::IndentOutOfRange(indent));
        }
        if let Instruction::For { times } = instruction {
            if !(1..=MAX_REPEAT).contains(&times) {
                return Err(ProgramError::RepeatOutOfRange(times));
            }
        }
        Ok(Self {
            instruction,
            indent,
        })
    }

    /// Decodes the editor's raw `(command id, param, indent)` triple.
    pub fn from_raw(command_id: u8, param: u8, indent: u8) -> Result<Self, ProgramError> {
        Self::new(Instruction::from_raw(command_id, param)?, indent)
    }

    /// Encodes the line back into its raw triple.
    #[must_use]
    pub const fn to_raw(&self) -> RawInstructionLine {
        RawInstructionLine {
            cmd: self.instruction.command_id(),
            param: self.instruction.raw_param(),
            indent: self.indent,
        }
    }

    /// Instruction stored on the line.
    #[must_use]
    pub const fn instruction(&self) -> Instruction {
        self.instruction
    }

    /// Indentation level of the line.
    #[must_use]
    pub const fn indent(&self) -> u8 {
        self.indent
    }

    /// Reports whether the line is empty.
    #[must_use]
    pub const fn is_nop(&self) -> bool {
        self.instruction.is_nop()
    }
}

impl Default for InstructionLine {
    fn default() -> Self {
        Self::NOP
    }
}

impl TryFrom<RawInstructionLine> for InstructionLine {
    type Error = ProgramError;

    fn try_from(raw: RawInstructionLine) -> Result<Self, Self::Error> {
        Self::from_raw(raw.cmd, raw.param, raw.indent)
    }
}

impl From<InstructionLine> for RawInstructionLine {
    fn from(line: InstructionLine) -> Self {
        line.to_raw()
    }
}

impl fmt::Display for InstructionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::from(self.indent) * LISTING_INDENT_WIDTH;
        write!(f, "{:width$}{}", "", self.instruction)
    }
}

impl FromStr for InstructionLine {
    type Err = ProgramError;

    /// Parses a listing line, reading [`LISTING_INDENT_WIDTH`] leading spaces
    /// per indentation level.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim_start_matches(' ');
        let spaces = value.len() - trimmed.len();
        if spaces % LISTING_INDENT_WIDTH != 0 {
            return Err(ProgramError::MisalignedIndent(spaces));
        }
        let indent = u8::try_from(spaces / LISTING_INDENT_WIDTH)
            .map_err(|_| ProgramError::MisalignedIndent(spaces))?;
        Self::new(trimmed.trim_end().parse()?, indent)
    }
}

/// Fixed-length sequence of [`PROGRAM_LINES`] instruction lines.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<InstructionLine>", into = "Vec<InstructionLine>")]
pub struct Program {
    lines: Vec<InstructionLine>,
}

impl Program {
    /// Creates a program made entirely of empty lines.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![InstructionLine::NOP; PROGRAM_LINES],
        }
    }

    /// Builds a program from leading lines, padding the remainder with NOPs.
    pub fn from_lines<I>(lines: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = InstructionLine>,
    {
        let mut collected: Vec<InstructionLine> = lines.into_iter().collect();
        if collected.len() > PROGRAM_LINES {
            return Err(ProgramError::TooManyLines(collected.len()));
        }
        collected.resize(PROGRAM_LINES, InstructionLine::NOP);
        Ok(Self { lines: collected })
    }

    /// Parses a text listing, one instruction per line.
    pub fn from_listing<I, S>(listing: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = listing
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                text.as_ref()
                    .parse::<InstructionLine>()
                    .map_err(|source| ProgramError::Listing {
                        line: index,
                        source: Box::new(source),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_lines(lines)
    }

    /// All lines in program order.
    #[must_use]
    pub fn lines(&self) -> &[InstructionLine] {
        &self.lines
    }

    /// Line at the provided index.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&InstructionLine> {
        self.lines.get(index)
    }

    /// Replaces the line at the provided index.
    pub fn set_line(&mut self, index: usize, line: InstructionLine) -> Result<(), ProgramError> {
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(ProgramError::LineOutOfRange(index))?;
        *slot = line;
        Ok(())
    }

    /// Number of non-empty lines.
    #[must_use]
    pub fn count_lines(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_nop()).count()
    }

    /// First line of the body governed by the control line at `index`.
    ///
    /// The body starts at the next non-NOP line if it is strictly more
    /// indented; any other next line (or none) means the block has no body.
    #[must_use]
    pub fn block_body(&self, index: usize) -> Option<usize> {
        let indent = self.lines.get(index)?.indent();
        self.lines
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, line)| !line.is_nop())
            .filter(|(_, line)| line.indent() > indent)
            .map(|(body, _)| body)
    }

    /// First line after the block opened at `index`: the next non-NOP line at
    /// equal or lower indentation, or the program length.
    #[must_use]
    pub fn block_end(&self, index: usize) -> usize {
        let Some(indent) = self.lines.get(index).map(InstructionLine::indent) else {
            return self.lines.len();
        };
        self.lines
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, line)| !line.is_nop() && line.indent() <= indent)
            .map_or(self.lines.len(), |(end, _)| end)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<InstructionLine>> for Program {
    type Error = ProgramError;

    fn try_from(lines: Vec<InstructionLine>) -> Result<Self, Self::Error> {
        Self::from_lines(lines)
    }
}

impl From<Program> for Vec<InstructionLine> {
    fn from(program: Program) -> Self {
        program.lines
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Reasons a program line or listing could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// The command id does not index the command table.
    #[error("unknown command id {0}")]
    UnknownCommand(u8),
    /// The condition id does not index the condition table.
    #[error("unknown condition id {0}")]
    UnknownCondition(u8),
    /// The condition name is not in the condition table.
    #[error("unknown condition `{0}`")]
    UnknownConditionName(String),
    /// The command name is not in the command table.
    #[error("unknown command `{0}`")]
    UnknownMnemonic(String),
    /// A FOR repeat count outside `1..=MAX_REPEAT`.
    #[error("FOR repeat count {0} is outside 1..={max}", max = MAX_REPEAT)]
    RepeatOutOfRange(u8),
    /// An indentation deeper than [`MAX_INDENT`].
    #[error("indent {0} exceeds the maximum of {max}", max = MAX_INDENT)]
    IndentOutOfRange(u8),
    /// A command that requires an argument was given none.
    #[error("{0} requires an argument")]
    MissingArgument(&'static str),
    /// A command was given an argument it does not accept.
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    /// Leading spaces are not a multiple of [`LISTING_INDENT_WIDTH`].
    #[error("{0} leading spaces do not form a whole indent level")]
    MisalignedIndent(usize),
    /// More lines than the program can hold.
    #[error("program has {0} lines but holds at most {max}", max = PROGRAM_LINES)]
    TooManyLines(usize),
    /// A line index outside the program.
    #[error("line {0} is outside the program")]
    LineOutOfRange(usize),
    /// A listing line failed to parse.
    #[error("listing line {line}: {source}")]
    Listing {
        /// Zero-based listing line.
        line: usize,
        /// Underlying decode failure.
        source: Box<ProgramError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> InstructionLine {
        text.parse().expect("line parses")
    }

    #[test]
    fn raw_encoding_preserves_editor_semantics() {
        let repeat = InstructionLine::from_raw(7, 2, 1).expect("FOR decodes");
        assert_eq!(repeat.instruction(), Instruction::For { times: 3 });
        assert_eq!(
            repeat.to_raw(),
            RawInstructionLine {
                cmd: 7,
                param: 2,
                indent: 1
            }
        );

        let guard = InstructionLine::from_raw(9, 12, 0).expect("IF TRUE decodes");
        assert_eq!(guard.instruction(), Instruction::If(Condition::True));
    }

    #[test]
    fn raw_decoding_rejects_out_of_table_values() {
        assert_eq!(
            InstructionLine::from_raw(10, 0, 0),
            Err(ProgramError::UnknownCommand(10))
        );
        assert_eq!(
            InstructionLine::from_raw(8, 13, 0),
            Err(ProgramError::UnknownCondition(13))
        );
        assert_eq!(
            InstructionLine::from_raw(7, 10, 0),
            Err(ProgramError::RepeatOutOfRange(11))
        );
        assert_eq!(
            InstructionLine::from_raw(1, 0, 5),
            Err(ProgramError::IndentOutOfRange(5))
        );
    }

    #[test]
    fn listing_text_matches_editor_display() {
        for text in ["MOVE", "  FOR 3", "    WHILE !BLOCKED", "IF ENEMY", "---"] {
            assert_eq!(line(text).to_string(), text);
        }
        assert_eq!(line("  l-turn").instruction(), Instruction::TurnLeft);
        assert_eq!(line("  l-turn").indent(), 1);
    }

    #[test]
    fn listing_rejects_bad_lines() {
        assert_eq!(
            " MOVE".parse::<InstructionLine>(),
            Err(ProgramError::MisalignedIndent(1))
        );
        assert_eq!(
            "FOR".parse::<InstructionLine>(),
            Err(ProgramError::MissingArgument("FOR"))
        );
        assert_eq!(
            "FOR 11".parse::<InstructionLine>(),
            Err(ProgramError::RepeatOutOfRange(11))
        );
        assert!(matches!(
            "JUMP".parse::<InstructionLine>(),
            Err(ProgramError::UnknownMnemonic(_))
        ));
        assert!(matches!(
            "MOVE 2".parse::<InstructionLine>(),
            Err(ProgramError::UnexpectedArgument(_))
        ));
    }

    #[test]
    fn program_pads_to_fixed_length() {
        let program = Program::from_listing(["MOVE", "MOVE"]).expect("program parses");
        assert_eq!(program.lines().len(), PROGRAM_LINES);
        assert_eq!(program.count_lines(), 2);
        assert!(program.line(2).is_some_and(InstructionLine::is_nop));

        let overflow = vec![InstructionLine::NOP; PROGRAM_LINES + 1];
        assert_eq!(
            Program::from_lines(overflow),
            Err(ProgramError::TooManyLines(PROGRAM_LINES + 1))
        );
    }

    #[test]
    fn block_body_skips_nops_and_requires_deeper_indent() {
        let program =
            Program::from_listing(["FOR 2", "---", "  MOVE", "WAIT", "IF ENEMY", "WAIT"])
                .expect("program parses");
        assert_eq!(program.block_body(0), Some(2));
        assert_eq!(program.block_body(4), None);
        assert_eq!(program.block_end(0), 3);
        assert_eq!(program.block_end(4), 5);
    }

    #[test]
    fn block_end_defaults_to_program_length() {
        let program = Program::from_listing(["WHILE TRUE", "  MOVE"]).expect("program parses");
        assert_eq!(program.block_end(0), PROGRAM_LINES);
        assert_eq!(program.block_body(PROGRAM_LINES - 1), None);
    }

    #[test]
    fn if_rejects_the_true_condition() {
        assert!(!Condition::True.allowed_in_if());
        assert!(Condition::Enemy.allowed_in_if());
        assert_eq!(Condition::from_id(12), Some(Condition::True));
        assert_eq!("!r-wall".parse::<Condition>(), Ok(Condition::NoWallRight));
    }
}
