use crate::infra::{Color, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Wall,
    Key,
    Door,
    Goal,
    Gift,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Wall => "wall",
            ObjectKind::Key => "key",
            ObjectKind::Door => "door",
            ObjectKind::Goal => "goal",
            ObjectKind::Gift => "gift",
        }
    }
}

/// Anything that can occupy a grid cell or be carried by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldObject {
    Wall,
    Key(Color),
    Door { color: Color, locked: bool, open: bool },
    Goal,
    Gift,
}

impl WorldObject {
    pub fn locked_door(color: Color) -> Self {
        WorldObject::Door {
            color,
            locked: true,
            open: false,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            WorldObject::Wall => ObjectKind::Wall,
            WorldObject::Key(_) => ObjectKind::Key,
            WorldObject::Door { .. } => ObjectKind::Door,
            WorldObject::Goal => ObjectKind::Goal,
            WorldObject::Gift => ObjectKind::Gift,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            WorldObject::Key(color) | WorldObject::Door { color, .. } => Some(*color),
            _ => None,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, WorldObject::Key(_))
    }

    /// Whether the agent may stand on the cell holding this object.
    pub fn can_overlap(&self) -> bool {
        match self {
            WorldObject::Goal => true,
            WorldObject::Door { open, .. } => *open,
            _ => false,
        }
    }

    pub fn can_pickup(&self) -> bool {
        self.is_key()
    }

    fn glyph(&self) -> String {
        const RESET: &str = "\x1b[0m";
        const WALL: &str = "\x1b[90m";
        const GOAL: &str = "\x1b[1;32m";
        const GIFT: &str = "\x1b[1;35m";

        match self {
            WorldObject::Wall => format!("{}█{}", WALL, RESET),
            WorldObject::Key(color) => format!("{}k{}", color.ansi(), RESET),
            WorldObject::Door { color, locked, open } => {
                let c = if *open {
                    '_'
                } else if *locked {
                    'L'
                } else {
                    'D'
                };
                format!("{}{}{}", color.ansi(), c, RESET)
            }
            WorldObject::Goal => format!("{}G{}", GOAL, RESET),
            WorldObject::Gift => format!("{}g{}", GIFT, RESET),
        }
    }
}

/// Dense, row-major cell storage for a bordered grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<WorldObject>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width.max(0) * height.max(0)) as usize],
        }
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: &Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: &Position) -> Option<&WorldObject> {
        self.index(pos).and_then(|i| self.cells[i].as_ref())
    }

    /// Places `object` at `pos`, returning what was there. Out-of-bounds writes are ignored.
    pub fn insert(&mut self, pos: Position, object: WorldObject) -> Option<WorldObject> {
        let i = self.index(&pos)?;
        self.cells[i].replace(object)
    }

    pub fn remove(&mut self, pos: &Position) -> Option<WorldObject> {
        let i = self.index(pos)?;
        self.cells[i].take()
    }

    pub fn is_empty_at(&self, pos: &Position) -> bool {
        self.in_bounds(pos) && self.get(pos).is_none()
    }

    /// Cells the agent can stand on: empty or overlappable.
    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.in_bounds(pos) && self.get(pos).is_none_or(|obj| obj.can_overlap())
    }

    pub fn horz_wall(&mut self, x: i32, y: i32, length: Option<i32>) {
        let length = length.unwrap_or(self.width - x);
        for i in 0..length {
            self.insert(Position::new(x + i, y), WorldObject::Wall);
        }
    }

    pub fn vert_wall(&mut self, x: i32, y: i32, length: Option<i32>) {
        let length = length.unwrap_or(self.height - y);
        for j in 0..length {
            self.insert(Position::new(x, y + j), WorldObject::Wall);
        }
    }

    pub fn wall_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.horz_wall(x, y, Some(w));
        self.horz_wall(x, y + h - 1, Some(w));
        self.vert_wall(x, y, Some(h));
        self.vert_wall(x + w - 1, y, Some(h));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &WorldObject)> {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let i = i as i32;
            cell.as_ref()
                .map(|obj| (Position::new(i % self.width, i / self.width), obj))
        })
    }

    pub fn positions_of(&self, kind: ObjectKind) -> Vec<Position> {
        self.iter()
            .filter(|(_, obj)| obj.kind() == kind)
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn count(&self, kind: ObjectKind) -> usize {
        self.iter().filter(|(_, obj)| obj.kind() == kind).count()
    }

    pub fn draw_ascii(&self, agent: Position) -> String {
        const RESET: &str = "\x1b[0m";
        const AGENT: &str = "\x1b[1;33m";

        let mut output = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if pos == agent {
                    output.push_str(&format!("{}@{}", AGENT, RESET));
                } else {
                    match self.get(&pos) {
                        Some(obj) => output.push_str(&obj.glyph()),
                        None => output.push(' '),
                    }
                }
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_rect_borders() {
        let mut grid = Grid::new(5, 4);
        grid.wall_rect(0, 0, 5, 4);

        assert_eq!(grid.get(&Position::new(0, 0)), Some(&WorldObject::Wall));
        assert_eq!(grid.get(&Position::new(4, 3)), Some(&WorldObject::Wall));
        assert!(grid.is_empty_at(&Position::new(2, 2)));
        assert_eq!(grid.count(ObjectKind::Wall), 2 * 5 + 2 * 2);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut grid = Grid::new(4, 4);
        let pos = Position::new(1, 2);

        assert_eq!(grid.insert(pos, WorldObject::Key(Color::Red)), None);
        assert_eq!(grid.positions_of(ObjectKind::Key), vec![pos]);
        assert_eq!(grid.remove(&pos), Some(WorldObject::Key(Color::Red)));
        assert!(grid.is_empty_at(&pos));
        assert_eq!(grid.insert(Position::new(9, 9), WorldObject::Goal), None);
    }

    #[test]
    fn test_walkable_cells() {
        let mut grid = Grid::new(4, 4);
        grid.insert(Position::new(1, 1), WorldObject::Goal);
        grid.insert(Position::new(2, 1), WorldObject::locked_door(Color::Yellow));
        grid.insert(
            Position::new(2, 2),
            WorldObject::Door {
                color: Color::Yellow,
                locked: false,
                open: true,
            },
        );

        assert!(grid.is_walkable(&Position::new(1, 1)));
        assert!(!grid.is_walkable(&Position::new(2, 1)));
        assert!(grid.is_walkable(&Position::new(2, 2)));
        assert!(!grid.is_walkable(&Position::new(-1, 0)));
    }
}
