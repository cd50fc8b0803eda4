use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use proggy_core::{Event, Program};
use proggy_simulation::{Simulation, Snapshot};
use proggy_world::parse_level;

const GAUNTLET: [&str; 10] = [
    "11111111", "10000001", "10200001", "10000301", "14000091", "10000001", "10020001",
    "10000001", "10000001", "11111111",
];

const SCRIPT: [&str; 12] = [
    "FOR 2",
    "  IF ENEMY",
    "    PULSE",
    "  WAIT",
    "WHILE !BLOCKED",
    "  IF !ENEMY",
    "    MOVE",
    "  IF ENEMY",
    "    DEFEND",
    "    PULSE",
    "L-TURN",
    "MOVE",
];

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    events: Vec<Event>,
    history: Vec<Snapshot>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay() -> ReplayOutcome {
    let level = parse_level("gauntlet", &GAUNTLET, 2, 1).expect("level parses");
    let program = Program::from_listing(SCRIPT).expect("listing parses");
    let mut simulation = Simulation::start(level, &program).expect("program is valid");
    let mut events = Vec::new();

    for _ in 0..3 {
        simulation.preview_tick(&mut events);
    }
    simulation.reset();
    while !simulation.is_done() && simulation.tick_count() < 64 {
        simulation.tick(&program, &mut events);
    }

    ReplayOutcome {
        events,
        history: simulation.history().iter().cloned().collect(),
    }
}

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(!first.events.is_empty());
}

#[test]
fn snapshots_round_trip_through_bincode() {
    let outcome = replay();
    for snapshot in &outcome.history {
        let bytes = bincode::serialize(snapshot).expect("serialize");
        let restored: Snapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, snapshot);
    }
}
