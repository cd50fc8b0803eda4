use proggy_core::{Instruction, InstructionLine, Level, Program, MAX_INDENT, PROGRAM_LINES};
use proggy_simulation::Simulation;
use proggy_world::parse_level;
use proptest::prelude::*;

const ARENA: [&str; 10] = [
    "11111111", "10000201", "10000001", "10030001", "14000091", "10010001", "10000001",
    "12000001", "10000001", "11111111",
];

const PATROL_PROGRAM: [&str; 6] = [
    "WHILE !BLOCKED",
    "  MOVE",
    "  IF ENEMY",
    "    PULSE",
    "R-TURN",
    "MOVE",
];

#[derive(Clone, Copy, Debug)]
enum Op {
    Tick,
    Preview,
    Scrub(usize),
}

fn arena() -> Level {
    parse_level("arena", &ARENA, 2, 2).expect("arena parses")
}

/// Builds programs that always pass validation: a block is always followed by
/// a deeper body line, other lines only keep or reduce the indentation, and
/// IF never uses TRUE.
fn shape_program(raw: Vec<(u8, u8, u8)>) -> Program {
    let mut lines = Vec::with_capacity(raw.len());
    let mut previous: Option<(u8, bool)> = None;

    for (command, param, dedent) in raw {
        if command == 0 {
            lines.push(InstructionLine::NOP);
            continue;
        }
        let indent = match previous {
            Some((indent, true)) => indent + 1,
            Some((indent, false)) => indent - dedent % (indent + 1),
            None => 0,
        };
        let (command, param) = match command {
            7..=9 if indent == MAX_INDENT => (4, 0),
            7 => (7, param % 10),
            8 => (8, param),
            9 if param == 12 => (9, 10),
            9 => (9, param),
            other => (other, 0),
        };
        let line = InstructionLine::from_raw(command, param, indent).expect("shaped line is valid");
        previous = Some((indent, line.instruction().block_kind().is_some()));
        lines.push(line);
    }

    if let Some(last) = lines.iter_mut().rev().find(|line| !line.is_nop()) {
        if last.instruction().block_kind().is_some() {
            *last = InstructionLine::new(Instruction::Wait, last.indent()).expect("wait is valid");
        }
    }

    Program::from_lines(lines).expect("program fits")
}

fn valid_program_strategy() -> impl Strategy<Value = Program> {
    prop::collection::vec((0u8..10, 0u8..13, 0u8..=MAX_INDENT), 0..=PROGRAM_LINES)
        .prop_map(shape_program)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Tick),
        1 => Just(Op::Preview),
        1 => (0usize..24).prop_map(Op::Scrub),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn valid_programs_run_to_completion(program in valid_program_strategy()) {
        prop_assert!(Simulation::validate_code(&program).is_empty());
        let mut simulation = Simulation::start(arena(), &program).expect("program is valid");
        let mut events = Vec::new();

        for _ in 0..200 {
            if simulation.is_done() {
                break;
            }
            simulation.tick(&program, &mut events);
            prop_assert_eq!(simulation.history_len() as u64, simulation.tick_count() + 1);
            prop_assert_eq!(simulation.history_index() + 1, simulation.history_len());
        }
    }

    #[test]
    fn history_tracks_ticks_and_discards_branches(
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let program = Program::from_listing(PATROL_PROGRAM).expect("listing parses");
        let mut simulation = Simulation::new(arena());
        let mut events = Vec::new();
        prop_assert_eq!(simulation.history_len(), 1);

        for op in ops {
            let index = simulation.history_index();
            let len = simulation.history_len();
            match op {
                Op::Tick => {
                    let was_done = simulation.is_done();
                    simulation.tick(&program, &mut events);
                    if was_done || simulation.history_len() == len {
                        prop_assert_eq!(simulation.history_index(), index);
                    } else {
                        prop_assert_eq!(simulation.history_len(), index + 2);
                        prop_assert_eq!(simulation.history_index(), index + 1);
                    }
                }
                Op::Preview => {
                    simulation.preview_tick(&mut events);
                    prop_assert_eq!(simulation.history_len(), index + 2);
                    prop_assert_eq!(simulation.history_index(), index + 1);
                }
                Op::Scrub(target) => {
                    let restored = simulation.scrub_to(target);
                    prop_assert_eq!(restored, target.min(len - 1));
                    prop_assert_eq!(simulation.history_len(), len);
                }
            }
            prop_assert!(simulation.history_index() < simulation.history_len());
        }
    }

    #[test]
    fn scrubbing_twice_yields_the_same_snapshot(ticks in 0usize..12, target in 0usize..16) {
        let program = Program::from_listing(PATROL_PROGRAM).expect("listing parses");
        let mut simulation = Simulation::new(arena());
        let mut events = Vec::new();
        for _ in 0..ticks {
            simulation.tick(&program, &mut events);
        }

        let first = simulation.scrub_to(target);
        let world = simulation.world().clone();
        let cursor = simulation.cursor().clone();
        let second = simulation.scrub_to(target);

        prop_assert_eq!(first, second);
        prop_assert_eq!(simulation.world(), &world);
        prop_assert_eq!(simulation.cursor(), &cursor);
        let recorded = simulation.history().get(first).expect("restored index is recorded");
        prop_assert_eq!(&recorded.world, &world);
    }
}
