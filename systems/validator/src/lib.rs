#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static program checks that gate the start of a simulation run.
//!
//! Every line is inspected independently and all findings are reported in
//! line order, so an editor can highlight each offending line at once.

use proggy_core::{BlockKind, Instruction, Program};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authoring mistake detected on a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Issue {
    /// A control line whose next non-empty line is not indented deeper.
    #[error("{0} needs a body (indent next line)")]
    MissingBody(BlockKind),
    /// An indented line whose enclosing line is not a control line.
    #[error("Indented line has no parent block")]
    OrphanedIndent,
    /// An IF guarded by the always-true condition.
    #[error("IF cannot use TRUE condition")]
    UnconditionalIf,
}

/// Issue located at a program line. Displays as the user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("{issue}")]
pub struct ValidationError {
    /// Zero-based line index.
    pub line: usize,
    /// What is wrong with the line.
    pub issue: Issue,
}

/// Checks the whole program and returns every finding in line order.
///
/// Findings for the same line are ordered missing body, orphaned indent,
/// then unconditional IF.
#[must_use]
pub fn validate(program: &Program) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (line, current) in program.lines().iter().enumerate() {
        let instruction = current.instruction();
        let mut report = |issue| errors.push(ValidationError { line, issue });

        if let Some(kind) = instruction.block_kind() {
            if program.block_body(line).is_none() {
                report(Issue::MissingBody(kind));
            }
        }

        if current.indent() > 0 && !current.is_nop() && !has_parent_block(program, line) {
            report(Issue::OrphanedIndent);
        }

        if let Instruction::If(condition) = instruction {
            if !condition.allowed_in_if() {
                report(Issue::UnconditionalIf);
            }
        }
    }

    errors
}

/// First finding, which is what blocks a simulation start.
#[must_use]
pub fn first_error(program: &Program) -> Option<ValidationError> {
    validate(program).into_iter().next()
}

fn has_parent_block(program: &Program, line: usize) -> bool {
    let lines = program.lines();
    let Some(indent) = lines.get(line).map(|current| current.indent()) else {
        return false;
    };

    lines[..line]
        .iter()
        .rev()
        .filter(|candidate| !candidate.is_nop())
        .find(|candidate| candidate.indent() < indent)
        .is_some_and(|parent| parent.instruction().block_kind().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(listing: &[&str]) -> Program {
        Program::from_listing(listing).expect("listing parses")
    }

    #[test]
    fn well_formed_program_passes() {
        let program = program(&[
            "WHILE !BLOCKED",
            "  MOVE",
            "  ---",
            "  IF ENEMY",
            "    PULSE",
            "R-TURN",
        ]);
        assert!(validate(&program).is_empty());
        assert_eq!(first_error(&program), None);
    }

    #[test]
    fn empty_program_passes() {
        assert!(validate(&Program::new()).is_empty());
    }

    #[test]
    fn control_line_without_body_is_reported() {
        let program = program(&["FOR 3", "MOVE", "IF ENEMY"]);
        let errors = validate(&program);
        assert_eq!(
            errors,
            vec![
                ValidationError {
                    line: 0,
                    issue: Issue::MissingBody(BlockKind::For)
                },
                ValidationError {
                    line: 2,
                    issue: Issue::MissingBody(BlockKind::If)
                },
            ]
        );
        assert_eq!(errors[0].to_string(), "FOR needs a body (indent next line)");
    }

    #[test]
    fn indentation_under_an_action_is_orphaned() {
        let program = program(&["MOVE", "  WAIT", "FOR 2", "  ---", "  WAIT", "    MOVE"]);
        let errors = validate(&program);
        let lines: Vec<usize> = errors.iter().map(|error| error.line).collect();
        assert_eq!(lines, vec![1, 5]);
        assert!(errors
            .iter()
            .all(|error| error.issue == Issue::OrphanedIndent));
        assert_eq!(errors[0].to_string(), "Indented line has no parent block");
    }

    #[test]
    fn if_true_is_rejected_but_while_true_is_not() {
        let program = program(&["WHILE TRUE", "  MOVE", "IF TRUE", "  WAIT"]);
        assert_eq!(
            validate(&program),
            vec![ValidationError {
                line: 2,
                issue: Issue::UnconditionalIf
            }]
        );
        assert_eq!(
            first_error(&program).map(|error| error.to_string()),
            Some(String::from("IF cannot use TRUE condition"))
        );
    }
}
