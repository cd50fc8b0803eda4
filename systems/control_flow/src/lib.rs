#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control-flow resolver that walks a program to its next actionable line.
//!
//! Blocks are delimited purely by indentation. The resolver keeps open
//! blocks on the cursor's stack, closes them when it reaches a line that is
//! no deeper than the block header, and loops or pops according to the block
//! kind. Condition evaluation is delegated to the caller so the system never
//! touches world state.

use proggy_core::{
    Action, BlockFrame, Condition, FrameState, HaltReason, Instruction, Program, ProgramCursor,
    RESOLVER_STEP_LIMIT,
};
use tracing::trace;

/// Outcome of one resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The cursor rests on an actionable line.
    Action {
        /// Line index of the action.
        line: usize,
        /// Action to perform.
        action: Action,
    },
    /// The program produced no further action.
    Halted(HaltReason),
}

/// Pure system that advances a [`ProgramCursor`] through control lines.
#[derive(Clone, Copy, Debug)]
pub struct ControlFlow {
    step_limit: usize,
}

impl ControlFlow {
    /// Creates a resolver with the default step budget.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_step_limit(RESOLVER_STEP_LIMIT)
    }

    /// Creates a resolver that gives up after `step_limit` steps per pass.
    #[must_use]
    pub const fn with_step_limit(step_limit: usize) -> Self {
        Self { step_limit }
    }

    /// Walks the program from `cursor.ip` until an actionable line is found.
    ///
    /// The cursor is left pointing at the returned line; the caller advances
    /// it once the action has been applied. Running past the last line halts
    /// the program even while blocks are still open.
    pub fn resolve<F>(
        &self,
        cursor: &mut ProgramCursor,
        program: &Program,
        evaluate: F,
    ) -> Resolution
    where
        F: Fn(Condition) -> bool,
    {
        for _ in 0..self.step_limit {
            let Some(line) = program.line(cursor.ip).copied() else {
                trace!(
                    ip = cursor.ip,
                    open_blocks = cursor.stack.len(),
                    "program ran off the end"
                );
                return Resolution::Halted(HaltReason::EndOfProgram);
            };
            cursor.executing_line = Some(cursor.ip);

            if line.is_nop() {
                cursor.advance();
                continue;
            }

            if let Some(top) = cursor.stack.last() {
                if line.indent() <= top.indent && cursor.ip > top.start_line {
                    close_innermost(cursor, &evaluate);
                    continue;
                }
            }

            let instruction = line.instruction();
            match instruction {
                Instruction::For { times } => enter_block(
                    cursor,
                    program,
                    line.indent(),
                    FrameState::For {
                        count: times,
                        iteration: 0,
                    },
                ),
                Instruction::While(condition) => {
                    if evaluate(condition) {
                        enter_block(
                            cursor,
                            program,
                            line.indent(),
                            FrameState::While { condition },
                        );
                    } else {
                        skip_block(cursor, program);
                    }
                }
                Instruction::If(condition) => {
                    if evaluate(condition) {
                        enter_block(cursor, program, line.indent(), FrameState::If);
                    } else {
                        skip_block(cursor, program);
                    }
                }
                _ => match instruction.action() {
                    Some(action) => {
                        trace!(line = cursor.ip, ?action, "resolved action");
                        return Resolution::Action {
                            line: cursor.ip,
                            action,
                        };
                    }
                    None => cursor.advance(),
                },
            }
        }

        trace!(ip = cursor.ip, limit = self.step_limit, "resolver step limit reached");
        Resolution::Halted(HaltReason::StepLimitExceeded)
    }
}

impl Default for ControlFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn enter_block(cursor: &mut ProgramCursor, program: &Program, indent: u8, state: FrameState) {
    let start_line = cursor.ip;
    let Some(body_start) = program.block_body(start_line) else {
        trace!(line = start_line, "block without body skipped");
        cursor.advance();
        return;
    };

    cursor.stack.push(BlockFrame {
        start_line,
        body_start,
        indent,
        state,
    });
    cursor.ip = body_start;
}

fn skip_block(cursor: &mut ProgramCursor, program: &Program) {
    let end = program.block_end(cursor.ip);
    trace!(line = cursor.ip, end, "condition false, skipping block");
    cursor.ip = end;
}

fn close_innermost<F>(cursor: &mut ProgramCursor, evaluate: &F)
where
    F: Fn(Condition) -> bool,
{
    let Some(frame) = cursor.stack.last_mut() else {
        return;
    };
    let body_start = frame.body_start;
    let again = match &mut frame.state {
        FrameState::For { count, iteration } => {
            *iteration += 1;
            *iteration < *count
        }
        FrameState::While { condition } => evaluate(*condition),
        FrameState::If => false,
    };

    if again {
        cursor.ip = body_start;
    } else {
        let _ = cursor.stack.pop();
    }
}
