//! The integer lattice the game is played on.

/// A single lattice cell. Signed so that a head stepping past the edge is
/// still representable and can be reported as a wall hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn step(self, direction: Direction) -> Cell {
        let delta = CellDelta::from(direction);
        Cell {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Unit step for a [`Direction`]. `y` grows downwards, matching terminal rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDelta {
    pub x: i32,
    pub y: i32,
}

impl From<Direction> for CellDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::North => CellDelta { x: 0, y: -1 },
            Direction::South => CellDelta { x: 0, y: 1 },
            Direction::East => CellDelta { x: 1, y: 0 },
            Direction::West => CellDelta { x: -1, y: 0 },
        }
    }
}

/// Fixed-size board. Cells within `inset` of any edge count as wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub inset: i32,
}

impl Grid {
    pub const fn new(width: i32, height: i32, inset: i32) -> Self {
        Grid {
            width,
            height,
            inset,
        }
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.width / 2, self.height / 2)
    }

    /// Inclusive bounds of the playable rectangle as `(min, max)`.
    pub fn bounds(&self) -> (Cell, Cell) {
        (
            Cell::new(self.inset, self.inset),
            Cell::new(self.width - self.inset - 1, self.height - self.inset - 1),
        )
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let (min, max) = self.bounds();
        (min.x..=max.x).contains(&cell.x) && (min.y..=max.y).contains(&cell.y)
    }

    pub fn area(&self) -> usize {
        let (min, max) = self.bounds();
        let w = (max.x - min.x + 1).max(0) as usize;
        let h = (max.y - min.y + 1).max(0) as usize;
        w * h
    }

    /// Every playable cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (min, max) = self.bounds();
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Cell::new(x, y)))
    }
}
