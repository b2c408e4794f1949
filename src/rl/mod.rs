//! Tabular Q-learning for the snake game
//!
//! Provides:
//! - Lossy state encoders (egocentric rays, absolute grid window)
//! - A lazily grown Q-table with an epsilon-greedy policy
//! - The learner that shapes rewards and runs episodes
//! - JSON persistence for tables, histories and replays

pub mod config;
pub mod learner;
pub mod observation;
pub mod persistence;
pub mod q_table;

pub use config::LearnerConfig;
pub use learner::{BestGame, MoveOutcome, SnakeLearner};
pub use observation::{
    GridView, MAX_SIGHT_DISTANCE, RayView, StateKey, ViewEncoder, ViewKind, make_encoder,
};
pub use persistence::TrainingMetadata;
pub use q_table::{ActionValues, QTable, sample_action};
