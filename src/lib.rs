//! Snake Learner - a tabular Q-learning agent for the game of Snake
//!
//! This library provides:
//! - Board simulation with a pluggable random source (game module)
//! - State encoding, Q-table and the learner itself (rl module)
//! - Episode history and rolling statistics (metrics module)
//! - TUI rendering and key handling for playback (render, input modules)
//! - Training and playback entry points (modes module)

pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use error::{LearnerError, Result};
