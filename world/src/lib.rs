#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Proggy.
//!
//! The world owns every mutable entity of a run: the player robot, the enemy
//! roster, the tick counter and the outcome flags. The static [`Level`] is
//! passed alongside each [`Command`] so cloned worlds never duplicate or alias
//! the level geometry.

use proggy_core::{
    Action, CellCoord, Command, DeathCause, EnemyId, EnemyKind, EnemyState, Event, HaltReason,
    Level, PlayerState, TickFlags, HARD_ENEMY_PULSE_PERIOD,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

mod conditions;
pub mod level;

pub use level::{parse_level, LevelError};

/// Represents the authoritative state of one simulation run.
///
/// Cloning a world produces a fully independent deep copy, which is how the
/// simulation records snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct World {
    player: PlayerState,
    enemies: Vec<EnemyState>,
    tick: u64,
    flags: TickFlags,
    won: bool,
    lost: bool,
    done: bool,
}

impl World {
    /// Creates the initial world for a level. Enemy specs are copied so the
    /// level template is never mutated.
    #[must_use]
    pub fn new(level: &Level) -> Self {
        let enemies = level
            .enemies
            .iter()
            .zip(0..)
            .map(|(spawn, index)| EnemyState::spawn(EnemyId::new(index), spawn))
            .collect();
        Self {
            player: PlayerState::spawn(level),
            enemies,
            tick: 0,
            flags: TickFlags::default(),
            won: false,
            lost: false,
            done: false,
        }
    }

    fn perform(&mut self, level: &Level, line: usize, action: Action, out_events: &mut Vec<Event>) {
        out_events.push(Event::InstructionStarted { line, action });
        let player = &mut self.player;
        match action {
            Action::Move => {
                let from = player.cell;
                match level.open_neighbor(from, player.facing) {
                    Some(to) => {
                        player.cell = to;
                        self.flags.player_moved = true;
                        out_events.push(Event::PlayerMoved { from, to });
                    }
                    None => out_events.push(Event::PlayerBlocked {
                        at: from,
                        facing: player.facing,
                    }),
                }
            }
            Action::TurnRight => {
                player.facing = player.facing.clockwise();
                out_events.push(Event::PlayerTurned {
                    facing: player.facing,
                });
            }
            Action::TurnLeft => {
                player.facing = player.facing.counter_clockwise();
                out_events.push(Event::PlayerTurned {
                    facing: player.facing,
                });
            }
            Action::Wait => out_events.push(Event::PlayerWaited),
            Action::Pulse => {
                if player.pulses == 0 {
                    out_events.push(Event::PulseUnavailable);
                    return;
                }
                player.pulses -= 1;
                self.flags.player_pulse = true;
                let origin = player.cell;
                out_events.push(Event::PulseFired { origin });

                for enemy in &mut self.enemies {
                    if enemy.is_live(EnemyKind::Soft) && enemy.cell.is_cardinally_adjacent(origin)
                    {
                        enemy.alive = false;
                        out_events.push(Event::EnemyDestroyed {
                            enemy: enemy.id,
                            cell: enemy.cell,
                        });
                    }
                }
            }
            Action::Defend => {
                if player.defends == 0 {
                    out_events.push(Event::DefendUnavailable);
                    return;
                }
                player.defends -= 1;
                self.flags.player_defend = true;
                out_events.push(Event::DefendRaised);
            }
        }
    }

    fn move_enemies(&mut self, level: &Level, out_events: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            if !enemy.is_live(EnemyKind::Soft) {
                continue;
            }
            let Some(patrol) = enemy.patrol.as_mut() else {
                continue;
            };

            let from = enemy.cell;
            match level.open_neighbor(from, patrol.heading) {
                Some(to) => {
                    enemy.cell = to;
                    out_events.push(Event::EnemyMoved {
                        enemy: enemy.id,
                        from,
                        to,
                    });
                }
                None => {
                    patrol.reverse();
                    out_events.push(Event::PatrolReversed {
                        enemy: enemy.id,
                        heading: patrol.heading,
                    });
                }
            }
        }
    }

    fn resolve_hard_enemy_pulses(&mut self, out_events: &mut Vec<Event>) {
        if self.tick % HARD_ENEMY_PULSE_PERIOD != 0 {
            return;
        }

        let shooters: Vec<EnemyState> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.is_live(EnemyKind::Hard))
            .copied()
            .collect();
        if shooters.is_empty() {
            return;
        }

        self.flags.hard_enemy_pulse = true;
        out_events.push(Event::HardEnemyPulsed);

        for enemy in shooters {
            if !within_pulse_reach(enemy.cell, self.player.cell) {
                continue;
            }
            if self.flags.player_defend {
                out_events.push(Event::AttackDeflected { enemy: enemy.id });
            } else {
                self.destroy_player(DeathCause::HardEnemyPulse { enemy: enemy.id }, out_events);
            }
        }
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;
        let collided = self
            .enemies
            .iter()
            .find(|enemy| enemy.alive && enemy.cell == cell)
            .map(|enemy| enemy.id);
        if let Some(enemy) = collided {
            self.destroy_player(DeathCause::Collision { enemy }, out_events);
        }
    }

    fn check_exit(&mut self, level: &Level, out_events: &mut Vec<Event>) {
        if self.player.cell != level.exit {
            return;
        }
        self.won = true;
        self.done = true;
        debug!(tick = self.tick, "exit reached");
        out_events.push(Event::ExitReached { cell: level.exit });
    }

    fn destroy_player(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        self.lost = true;
        self.done = true;
        if !self.player.alive {
            return;
        }
        self.player.alive = false;
        debug!(tick = self.tick, ?cause, "player destroyed");
        out_events.push(Event::PlayerDestroyed { cause });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, level: &Level, command: Command, out_events: &mut Vec<Event>) {
    trace!(?command, tick = world.tick, "apply");
    match command {
        Command::BeginTick => world.flags = TickFlags::default(),
        Command::Perform { line, action } => world.perform(level, line, action, out_events),
        Command::AdvanceClock => {
            world.tick = world.tick.saturating_add(1);
            out_events.push(Event::TimeAdvanced { tick: world.tick });
        }
        Command::MoveEnemies => world.move_enemies(level, out_events),
        Command::ResolveHardEnemyPulses => world.resolve_hard_enemy_pulses(out_events),
        Command::ResolveCollisions => world.resolve_collisions(out_events),
        Command::CheckExit => world.check_exit(level, out_events),
        Command::Halt { reason } => {
            world.done = true;
            if reason == HaltReason::StepLimitExceeded {
                debug!(tick = world.tick, "program exceeded the resolver step limit");
            }
            out_events.push(Event::ProgramHalted { reason });
        }
    }
}

/// Hard enemy pulses reach one cell along the enemy's row or column,
/// including the enemy's own cell.
fn within_pulse_reach(enemy: CellCoord, player: CellCoord) -> bool {
    let dx = enemy.column().abs_diff(player.column());
    let dy = enemy.row().abs_diff(player.row());
    (dx <= 1 && dy == 0) || (dy <= 1 && dx == 0)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use proggy_core::{CellCoord, Condition, EnemyId, EnemyState, Level, PlayerState, TickFlags};

    use super::World;

    /// Live player state.
    #[must_use]
    pub fn player(world: &World) -> &PlayerState {
        &world.player
    }

    /// Every enemy in level order, including destroyed ones.
    #[must_use]
    pub fn enemies(world: &World) -> &[EnemyState] {
        &world.enemies
    }

    /// Living enemy occupying the provided cell, if any.
    #[must_use]
    pub fn living_enemy_at(world: &World, cell: CellCoord) -> Option<EnemyId> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.alive && enemy.cell == cell)
            .map(|enemy| enemy.id)
    }

    /// Number of ticks elapsed since the run started.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Transient flags raised during the latest tick.
    #[must_use]
    pub fn flags(world: &World) -> TickFlags {
        world.flags
    }

    /// Reports whether the player reached the exit.
    #[must_use]
    pub fn is_won(world: &World) -> bool {
        world.won
    }

    /// Reports whether the player was destroyed.
    #[must_use]
    pub fn is_lost(world: &World) -> bool {
        world.lost
    }

    /// Reports whether the run is over.
    #[must_use]
    pub fn is_done(world: &World) -> bool {
        world.done
    }

    /// Evaluates a program condition against the current world.
    #[must_use]
    pub fn evaluate(world: &World, level: &Level, condition: Condition) -> bool {
        super::conditions::evaluate(condition, level, &world.player, &world.enemies)
    }
}
