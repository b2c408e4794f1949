//! State encoding for table lookup
//!
//! An encoder maps a [`Board`] to a [`StateKey`]. Encoding is lossy on
//! purpose: boards that produce the same key share one row of the Q-table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Board, Direction, Position, dot};

/// Largest sight distance an encoder accepts
pub const MAX_SIGHT_DISTANCE: u32 = 64;

/// Discretized summary of a board, used as the Q-table key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure mapping from board geometry to a state key
pub trait ViewEncoder: Send + Sync {
    fn encode(&self, board: &Board) -> StateKey;
}

/// Which encoder a learner uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Egocentric obstacle rays plus projected food direction
    #[default]
    Rays,
    /// Absolute window of cells around the head
    Grid,
}

/// Egocentric encoder: 8 obstacle rays and the food vector in the
/// forward/right frame of the current heading
///
/// Key layout: `r0,r1,r2,r3,r4,r5,r6,r7|forward,right` with rays ordered
/// forward, forward-right, right, back-right, back, back-left, left,
/// forward-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayView {
    sight_distance: Option<u32>,
}

impl RayView {
    pub fn new(sight_distance: Option<u32>) -> Self {
        Self { sight_distance }
    }

    /// Ray steps for the current heading, as (row, column) offsets
    fn rays(heading: Direction) -> [(i32, i32); 8] {
        let (fr, fc) = heading.displacement();
        let (rr, rc) = heading.right_of().displacement();
        [
            (fr, fc),
            (fr + rr, fc + rc),
            (rr, rc),
            (-fr + rr, -fc + rc),
            (-fr, -fc),
            (-fr - rr, -fc - rc),
            (-rr, -rc),
            (fr - rr, fc - rc),
        ]
    }

    /// Free cells from the head along `step` before the first obstacle
    fn obstacle_distance(&self, board: &Board, step: (i32, i32)) -> u32 {
        let mut distance = 0;
        let mut cell = board.head();
        loop {
            if self.sight_distance.is_some_and(|sight| distance >= sight) {
                return distance;
            }
            cell = cell.moved_by(step.0, step.1);
            if !board.is_valid_location(cell, true) {
                return distance;
            }
            distance += 1;
        }
    }

    fn clamp_component(&self, value: i32) -> i32 {
        match self.sight_distance {
            Some(sight) => {
                let sight = sight.min(i32::MAX as u32) as i32;
                value.clamp(-sight, sight)
            }
            None => value,
        }
    }

    /// Food vector projected on the heading's forward and right axes
    pub fn food_projection(&self, board: &Board) -> (i32, i32) {
        let vector = board.food_vector();
        let heading = board.heading();
        (
            self.clamp_component(dot(vector, heading)),
            self.clamp_component(dot(vector, heading.right_of())),
        )
    }

    /// Clamped obstacle distance for each of the 8 rays
    pub fn ray_distances(&self, board: &Board) -> [u32; 8] {
        Self::rays(board.heading()).map(|step| self.obstacle_distance(board, step))
    }
}

impl ViewEncoder for RayView {
    fn encode(&self, board: &Board) -> StateKey {
        let rays = self
            .ray_distances(board)
            .iter()
            .map(|distance| distance.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let (forward, right) = self.food_projection(board);
        StateKey(format!("{rays}|{forward},{right}"))
    }
}

/// Absolute square window of side `2 * sight_distance + 1` centred on the head
///
/// Cells read row by row: `F` for food, a space for a free cell, `X` for a
/// wall or body cell (the head included). The sight distance is capped at
/// [`MAX_SIGHT_DISTANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridView {
    sight_distance: u32,
}

impl GridView {
    pub const EMPTY: char = ' ';
    pub const BLOCK: char = 'X';
    pub const FOOD: char = 'F';

    pub fn new(sight_distance: u32) -> Self {
        Self {
            sight_distance: sight_distance.min(MAX_SIGHT_DISTANCE),
        }
    }

    fn cell_type(board: &Board, cell: Position) -> char {
        if board.food() == Some(cell) {
            Self::FOOD
        } else if board.is_valid_location(cell, true) {
            Self::EMPTY
        } else {
            Self::BLOCK
        }
    }
}

impl ViewEncoder for GridView {
    fn encode(&self, board: &Board) -> StateKey {
        let sight = self.sight_distance as i32;
        let side = (2 * self.sight_distance + 1) as usize;
        let head = board.head();
        let mut view = String::with_capacity(side * side);
        for drow in -sight..=sight {
            for dcol in -sight..=sight {
                view.push(Self::cell_type(board, head.moved_by(drow, dcol)));
            }
        }
        StateKey(view)
    }
}

/// Boxed encoder chosen by [`ViewKind`]
pub fn make_encoder(kind: ViewKind, sight_distance: Option<u32>) -> Box<dyn ViewEncoder> {
    match kind {
        ViewKind::Rays => Box::new(RayView::new(sight_distance)),
        ViewKind::Grid => Box::new(GridView::new(sight_distance.unwrap_or(1))),
    }
}
