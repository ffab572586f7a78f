use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::warn;

use crate::infra::Position;
use crate::state::Grid;

const MAX_EXPANSIONS: usize = 5000;

#[derive(Clone, Eq, PartialEq)]
struct Node {
    pos: Position,
    f_score: i32,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStar;

impl AStar {
    /// Shortest four-way path from `start` to `goal`, both included.
    ///
    /// `is_walkable` receives the candidate cell and the goal; cells outside
    /// the grid are never entered. The goal itself is usually blocked (a key,
    /// a gift, a closed door), so callers typically accept `pos == goal`.
    pub fn find_path<F>(
        grid: &Grid,
        start: Position,
        goal: Position,
        is_walkable: F,
    ) -> Option<Vec<Position>>
    where
        F: Fn(&Position, Position) -> bool,
    {
        if start == goal {
            return Some(vec![goal]);
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_score: HashMap<Position, i32> = HashMap::new();
        let mut closed_set: HashSet<Position> = HashSet::new();

        g_score.insert(start, 0);
        open_set.push(Node {
            pos: start,
            f_score: heuristic(start, goal),
        });

        let mut expansions = 0;

        while let Some(Node { pos: current, .. }) = open_set.pop() {
            if current == goal {
                return Some(reconstruct_path(&came_from, current));
            }

            if !closed_set.insert(current) {
                continue;
            }

            expansions += 1;
            if expansions > MAX_EXPANSIONS {
                warn!("A* gave up after {} expansions ({} -> {})", MAX_EXPANSIONS, start, goal);
                return None;
            }

            let current_g_score = *g_score.get(&current).unwrap_or(&0);

            for neighbor in current.neighbors() {
                if closed_set.contains(&neighbor) || !grid.in_bounds(&neighbor) {
                    continue;
                }

                if !is_walkable(&neighbor, goal) {
                    continue;
                }

                let tentative_g = current_g_score + 1;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&i32::MAX) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    open_set.push(Node {
                        pos: neighbor,
                        f_score: tentative_g + heuristic(neighbor, goal),
                    });
                }
            }
        }

        None
    }

    /// Path over the grid's walkable cells, ending on `goal` whatever it holds.
    pub fn find_path_to(grid: &Grid, start: Position, goal: Position) -> Option<Vec<Position>> {
        Self::find_path(grid, start, goal, |pos, goal| {
            *pos == goal || grid.is_walkable(pos)
        })
    }
}

fn heuristic(a: Position, b: Position) -> i32 {
    a.distance(&b)
}

fn reconstruct_path(came_from: &HashMap<Position, Position>, mut current: Position) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WorldObject;

    fn room() -> Grid {
        let mut grid = Grid::new(7, 7);
        grid.wall_rect(0, 0, 7, 7);
        grid
    }

    #[test]
    fn test_straight_line() {
        let grid = room();
        let path = AStar::find_path_to(&grid, Position::new(1, 1), Position::new(4, 1)).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.first(), Some(&Position::new(1, 1)));
        assert_eq!(path.last(), Some(&Position::new(4, 1)));
    }

    #[test]
    fn test_routes_through_gap() {
        let mut grid = room();
        grid.vert_wall(3, 0, None);
        grid.remove(&Position::new(3, 5));

        let path = AStar::find_path_to(&grid, Position::new(1, 1), Position::new(5, 1)).unwrap();
        assert!(path.contains(&Position::new(3, 5)));
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn test_blocked_goal_is_reachable_but_not_crossed() {
        let mut grid = room();
        grid.vert_wall(3, 0, None);
        grid.insert(Position::new(3, 2), WorldObject::locked_door(crate::infra::Color::Red));

        let door = AStar::find_path_to(&grid, Position::new(1, 2), Position::new(3, 2)).unwrap();
        assert_eq!(door.len(), 3);
        assert!(AStar::find_path_to(&grid, Position::new(1, 2), Position::new(5, 2)).is_none());
    }
}
