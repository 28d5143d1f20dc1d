use std::collections::VecDeque;

use crate::grid::{Cell, Direction};

/// The snake body, head first.
///
/// `current_direction` is the direction of the last move; `pending_direction`
/// is the queued input applied by the next [`Snake::advance`]. The body is
/// never shorter than one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    segments: VecDeque<Cell>,
    current_direction: Direction,
    pending_direction: Direction,
}

impl Snake {
    pub fn new(head: Cell, direction: Direction) -> Self {
        Snake {
            segments: VecDeque::from([head]),
            current_direction: direction,
            pending_direction: direction,
        }
    }

    /// Builds a snake from explicit segments, head first. Returns `None` for an
    /// empty body.
    pub fn from_segments(
        segments: impl IntoIterator<Item = Cell>,
        direction: Direction,
    ) -> Option<Self> {
        let segments: VecDeque<Cell> = segments.into_iter().collect();
        if segments.is_empty() {
            return None;
        }
        Some(Snake {
            segments,
            current_direction: direction,
            pending_direction: direction,
        })
    }

    pub fn head(&self) -> Cell {
        self.segments[0]
    }

    pub fn tail(&self) -> Cell {
        self.segments[self.segments.len() - 1]
    }

    pub fn segments(&self) -> &VecDeque<Cell> {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn current_direction(&self) -> Direction {
        self.current_direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    /// Where the head lands on the next advance.
    pub fn next_head(&self) -> Cell {
        self.head().step(self.pending_direction)
    }

    /// Queues a turn. A request to reverse onto the last move is ignored.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.current_direction.opposite() {
            self.pending_direction = direction;
        }
    }

    /// Pushes a new head one step along the pending direction. The tail stays
    /// put; removing it is up to the caller.
    pub fn advance(&mut self) {
        let new_head = self.next_head();
        self.segments.push_front(new_head);
        self.current_direction = self.pending_direction;
    }

    /// Doubles up the tail cell. The copy gets pulled forward by later moves.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.segments.push_back(tail);
    }

    pub fn shrink(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop_back();
        }
    }
}
