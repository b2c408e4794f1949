use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell on the game grid, addressed as (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move position by delta
    pub fn moved_by(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (drow, dcol) = direction.displacement();
        self.moved_by(drow, dcol)
    }

    /// Component-wise difference `self - other`
    pub fn offset_from(&self, other: Position) -> (i32, i32) {
        (self.row - other.row, self.col - other.col)
    }
}

impl From<[i32; 2]> for Position {
    fn from(cell: [i32; 2]) -> Self {
        Self::new(cell[0], cell[1])
    }
}

/// Manhattan length of a grid vector
pub fn block_distance(vector: (i32, i32)) -> u32 {
    vector.0.unsigned_abs() + vector.1.unsigned_abs()
}

/// Dot product of a grid vector with a heading's unit displacement
pub fn dot(vector: (i32, i32), direction: Direction) -> i32 {
    let (drow, dcol) = direction.displacement();
    vector.0 * drow + vector.1 * dcol
}

/// Heading best aligned with `vector` (ties go to the earlier heading)
///
/// Returns `None` for the zero vector.
pub fn closest_direction(vector: (i32, i32)) -> Option<Direction> {
    if vector == (0, 0) {
        return None;
    }
    let mut best = Direction::ALL[0];
    let mut best_dot = dot(vector, best);
    for direction in Direction::ALL.into_iter().skip(1) {
        let value = dot(vector, direction);
        if value > best_dot {
            best = direction;
            best_dot = value;
        }
    }
    Some(best)
}

/// One playback frame: everything a renderer needs to draw a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: usize,
    pub columns: usize,
    pub moves: usize,
    /// Body cells, tail first, head last
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub heading: Direction,
}

impl Snapshot {
    pub fn score(&self) -> usize {
        self.snake.len()
    }

    pub fn head(&self) -> Option<Position> {
        self.snake.last().copied()
    }
}
