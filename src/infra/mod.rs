mod default_observer;
mod episode_observer;
mod pathfinding;
mod types;

pub use default_observer::DefaultObserver;
pub use episode_observer::EpisodeObserver;
pub use pathfinding::AStar;
pub use types::{Bounds, Color, Direction, Position};

use crate::env::Action;

// ============================================================================
// Helper functions
// ============================================================================

/// Direction from `from` to an orthogonally adjacent `to`.
pub fn direction_to(from: Position, to: Position) -> Option<Direction> {
    if to.y < from.y {
        Some(Direction::North)
    } else if to.y > from.y {
        Some(Direction::South)
    } else if to.x > from.x {
        Some(Direction::East)
    } else if to.x < from.x {
        Some(Direction::West)
    } else {
        None
    }
}

/// First move along `path`, which starts at `current`.
pub fn path_to_action(current: Position, path: &[Position]) -> Option<Action> {
    if path.len() < 2 {
        return None;
    }
    direction_to(current, path[1]).map(Action::Move)
}

pub fn use_direction(from: Position, to: Position) -> Action {
    Action::Use(direction_to(from, to).unwrap_or(Direction::West))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_action() {
        let current = Position::new(2, 2);
        let path = [current, Position::new(2, 1), Position::new(3, 1)];
        assert_eq!(
            path_to_action(current, &path),
            Some(Action::Move(Direction::North))
        );
        assert_eq!(path_to_action(current, &path[..1]), None);
    }

    #[test]
    fn test_use_direction() {
        let from = Position::new(2, 2);
        assert_eq!(
            use_direction(from, Position::new(3, 2)),
            Action::Use(Direction::East)
        );
        assert_eq!(
            use_direction(from, Position::new(2, 3)),
            Action::Use(Direction::South)
        );
    }
}
