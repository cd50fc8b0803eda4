//! Condition evaluation against a world snapshot.

use proggy_core::{Condition, Direction, EnemyState, Level, PlayerState};

/// Evaluates `condition` for the player. Off-grid cells count as walls and
/// wall tests use absolute directions except the BLOCKED pair, which looks
/// along the player's facing.
pub(crate) fn evaluate(
    condition: Condition,
    level: &Level,
    player: &PlayerState,
    enemies: &[EnemyState],
) -> bool {
    let wall = |direction: Direction| level.is_blocked(player.cell, direction);
    let enemy_adjacent = || {
        enemies
            .iter()
            .any(|enemy| enemy.alive && enemy.cell.is_cardinally_adjacent(player.cell))
    };

    match condition {
        Condition::Blocked => wall(player.facing),
        Condition::NotBlocked => !wall(player.facing),
        Condition::WallUp => wall(Direction::North),
        Condition::WallDown => wall(Direction::South),
        Condition::WallLeft => wall(Direction::West),
        Condition::WallRight => wall(Direction::East),
        Condition::NoWallUp => !wall(Direction::North),
        Condition::NoWallDown => !wall(Direction::South),
        Condition::NoWallLeft => !wall(Direction::West),
        Condition::NoWallRight => !wall(Direction::East),
        Condition::Enemy => enemy_adjacent(),
        Condition::NoEnemy => !enemy_adjacent(),
        Condition::True => true,
    }
}
