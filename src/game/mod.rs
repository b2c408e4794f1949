//! Snake board model
//!
//! Pure game logic with no I/O. All randomness goes through a
//! [`RandomSource`] so a learner or a test can pin every draw.

pub mod action;
pub mod board;
pub mod config;
pub mod random;
pub mod state;

pub use action::{Direction, SnakeAction};
pub use board::Board;
pub use config::BoardConfig;
pub use random::{RandomSource, RngSource};
#[cfg(test)]
pub use random::ScriptedSource;
pub use state::{Position, Snapshot, block_distance, closest_direction, dot};
