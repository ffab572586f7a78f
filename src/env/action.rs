use crate::infra::Direction;

/// Discrete action set shared by every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Move(Direction),
    /// Pick up, open or unlock whatever is in the given direction.
    Use(Direction),
    Drop(Direction),
}

impl Action {
    pub const COUNT: usize = 13;

    pub const ALL: [Action; Action::COUNT] = [
        Action::Idle,
        Action::Move(Direction::North),
        Action::Move(Direction::East),
        Action::Move(Direction::South),
        Action::Move(Direction::West),
        Action::Use(Direction::North),
        Action::Use(Direction::East),
        Action::Use(Direction::South),
        Action::Use(Direction::West),
        Action::Drop(Direction::North),
        Action::Drop(Direction::East),
        Action::Drop(Direction::South),
        Action::Drop(Direction::West),
    ];

    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|a| a == self)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
    }
}
