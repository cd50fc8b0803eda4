//! Plain-text rendering of simulation progress.

use std::fmt::Write as _;

use proggy_core::{CellCoord, DeathCause, EnemyState, Event, PlayerState, Program};
use proggy_simulation::Simulation;

/// One trace line for a regular tick.
pub(crate) fn tick_line(simulation: &Simulation, program: &Program, events: &[Event]) -> String {
    let instruction = events
        .iter()
        .find_map(|event| match event {
            Event::InstructionStarted { line, .. } => Some(*line),
            _ => None,
        })
        .and_then(|line| program.line(line).map(|text| (line, text.instruction())));

    let mut out = format!("tick {:>3}", simulation.tick_count());
    match instruction {
        Some((line, instruction)) => {
            let _ = write!(out, "  line {:>2}  {:<14}", line + 1, instruction.to_string());
        }
        None => {
            let _ = write!(out, "  {:<23}", "(no instruction)");
        }
    }
    let _ = write!(out, "  {}", player(simulation.player()));

    let notes = notes(events);
    if !notes.is_empty() {
        let _ = write!(out, "  [{}]", notes.join(", "));
    }
    out
}

/// One trace line for a preview tick.
pub(crate) fn preview_line(simulation: &Simulation, events: &[Event]) -> String {
    let mut out = format!(
        "preview {:>3}  enemies {}",
        simulation.tick_count(),
        enemies(simulation.enemies())
    );
    let notes = notes(events);
    if !notes.is_empty() {
        let _ = write!(out, "  [{}]", notes.join(", "));
    }
    out
}

/// Final verdict of a run.
pub(crate) fn outcome(simulation: &Simulation, program: &Program) -> String {
    if simulation.is_lost() {
        return format!("LOST at tick {}", simulation.tick_count());
    }
    if let Some(score) = simulation.score(program) {
        return format!("WON in {} ticks using {} lines", score.ticks, score.lines);
    }
    if simulation.is_done() {
        return format!("HALTED at tick {} without reaching the exit", simulation.tick_count());
    }
    format!("STOPPED after {} ticks", simulation.tick_count())
}

/// Description of the live state after a scrub.
pub(crate) fn snapshot_line(simulation: &Simulation, index: usize) -> String {
    format!(
        "snapshot {index}/{}: tick {}  {}  enemies {}",
        simulation.history_len() - 1,
        simulation.tick_count(),
        player(simulation.player()),
        enemies(simulation.enemies())
    )
}

fn player(player: &PlayerState) -> String {
    format!(
        "player {} facing {:?} pulses {} defends {}",
        cell(player.cell),
        player.facing,
        player.pulses,
        player.defends
    )
}

fn enemies(enemies: &[EnemyState]) -> String {
    let living: Vec<String> = enemies
        .iter()
        .filter(|enemy| enemy.alive)
        .map(|enemy| format!("{:?}{}", enemy.kind, cell(enemy.cell)))
        .collect();
    if living.is_empty() {
        String::from("none")
    } else {
        living.join(" ")
    }
}

fn cell(cell: CellCoord) -> String {
    format!("({},{})", cell.column(), cell.row())
}

fn notes(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PlayerBlocked { .. } => Some(String::from("blocked")),
            Event::PulseFired { .. } => Some(String::from("pulse")),
            Event::PulseUnavailable => Some(String::from("no pulses left")),
            Event::EnemyDestroyed { cell: at, .. } => {
                Some(format!("enemy destroyed at {}", cell(*at)))
            }
            Event::DefendRaised => Some(String::from("shield up")),
            Event::DefendUnavailable => Some(String::from("no defends left")),
            Event::HardEnemyPulsed => Some(String::from("sentry pulse")),
            Event::AttackDeflected { .. } => Some(String::from("deflected")),
            Event::PlayerDestroyed { cause } => Some(match cause {
                DeathCause::HardEnemyPulse { .. } => String::from("destroyed by sentry"),
                DeathCause::Collision { .. } => String::from("destroyed by collision"),
            }),
            Event::ExitReached { .. } => Some(String::from("exit")),
            Event::ProgramHalted { reason } => Some(format!("halted: {reason:?}")),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proggy_world::parse_level;

    fn corridor() -> Simulation {
        let level = parse_level("corridor", &["11111", "14091", "11111"], 0, 0).expect("level");
        Simulation::new(level)
    }

    #[test]
    fn tick_line_names_the_instruction_and_position() {
        let program = Program::from_listing(["MOVE", "MOVE"]).expect("program");
        let mut simulation = corridor();
        let mut events = Vec::new();
        simulation.tick(&program, &mut events);

        let line = tick_line(&simulation, &program, &events);
        assert!(line.starts_with("tick   1  line  1  MOVE"));
        assert!(line.contains("player (2,1) facing East"));
        assert!(!line.contains('['));
    }

    #[test]
    fn outcome_reports_score_on_win() {
        let program = Program::from_listing(["MOVE", "MOVE"]).expect("program");
        let mut simulation = corridor();
        let mut events = Vec::new();
        assert_eq!(outcome(&simulation, &program), "STOPPED after 0 ticks");

        simulation.tick(&program, &mut events);
        simulation.tick(&program, &mut events);
        assert_eq!(outcome(&simulation, &program), "WON in 2 ticks using 2 lines");
        assert!(tick_line(&simulation, &program, &events[events.len() - 1..]).contains("[exit]"));
    }

    #[test]
    fn outcome_reports_halt() {
        let program = Program::from_listing(["L-TURN"]).expect("program");
        let mut simulation = corridor();
        let mut events = Vec::new();
        simulation.tick(&program, &mut events);
        simulation.tick(&program, &mut events);
        assert_eq!(
            outcome(&simulation, &program),
            "HALTED at tick 1 without reaching the exit"
        );
    }

    #[test]
    fn preview_line_lists_living_enemies() {
        let level = parse_level("patrol", &["1111", "1201", "4009"], 0, 0).expect("level");
        let mut simulation = Simulation::new(level);
        let mut events = Vec::new();
        simulation.preview_tick(&mut events);
        assert_eq!(preview_line(&simulation, &events), "preview   1  enemies Soft(2,1)");
        assert_eq!(
            snapshot_line(&simulation, 1),
            "snapshot 1/1: tick 1  player (0,2) facing East pulses 0 defends 0  enemies Soft(2,1)"
        );
    }
}
