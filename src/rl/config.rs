//! Q-learning hyperparameter and reward-shaping configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::observation::{MAX_SIGHT_DISTANCE, ViewKind};
use crate::error::{LearnerError, Result};
use crate::game::BoardConfig;

/// Configuration for a [`SnakeLearner`](super::SnakeLearner)
///
/// Covers the board geometry, the TD(0) hyperparameters, the reward shaping
/// coefficients and the state encoder. Missing keys in a JSON file take the
/// defaults below; unknown keys are rejected.
///
/// # Example
///
/// ```rust
/// use snake_learner::rl::LearnerConfig;
///
/// let config = LearnerConfig {
///     epsilon: 0.05,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearnerConfig {
    /// Number of grid rows
    ///
    /// Default: 8
    pub rows: usize,

    /// Number of grid columns
    ///
    /// Default: 8
    pub columns: usize,

    /// Snake length at the start of every episode
    ///
    /// Default: 3
    pub initial_length: usize,

    /// Discount factor applied to the bootstrapped next-state value
    ///
    /// Default: 0.9
    pub discount_factor: f64,

    /// Learning rate of the TD update
    ///
    /// Default: 0.6
    pub alpha: f64,

    /// Exploration rate of the epsilon-greedy policy
    ///
    /// Default: 0.1
    pub epsilon: f64,

    /// Growth rate of the loss penalty with the score at death
    ///
    /// Default: 0.0
    pub loss_change: f64,

    /// Growth rate of the eat reward with the new score
    ///
    /// Default: 0.15
    pub reward_change: f64,

    /// Decay rate of the move reward with the block distance to food
    ///
    /// Default: 0.3
    pub distance_change: f64,

    /// Base magnitude of the (negative) reward for losing
    ///
    /// Default: 10.0
    pub loss_penalty: f64,

    /// Base reward for eating
    ///
    /// Default: 10.0
    pub eat_reward: f64,

    /// Base reward for a plain move
    ///
    /// Default: 1.0
    pub move_reward: f64,

    /// Truncate an episode after this many moves without eating
    ///
    /// Required when `epsilon` is 0, since a purely greedy policy can cycle
    /// without ever ending the episode.
    ///
    /// Default: unlimited
    pub max_moves_to_score: Option<usize>,

    /// How far the encoder looks from the head, at most
    /// [`MAX_SIGHT_DISTANCE`]
    ///
    /// Default: 3
    pub sight_distance: Option<u32>,

    /// State encoder
    ///
    /// Default: rays
    pub view: ViewKind,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 8,
            initial_length: 3,
            discount_factor: 0.9,
            alpha: 0.6,
            epsilon: 0.1,
            loss_change: 0.0,
            reward_change: 0.15,
            distance_change: 0.3,
            loss_penalty: 10.0,
            eat_reward: 10.0,
            move_reward: 1.0,
            max_moves_to_score: None,
            sight_distance: Some(3),
            view: ViewKind::Rays,
        }
    }
}

impl LearnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Board geometry part of the configuration
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig::new(self.rows, self.columns).with_initial_length(self.initial_length)
    }

    /// Validate configuration parameters
    ///
    /// Checks the board geometry, that every rate is in range and that every
    /// shaping coefficient is finite. A greedy policy (`epsilon` 0) needs a
    /// move limit so every episode ends.
    pub fn validate(&self) -> Result<()> {
        self.board_config()
            .validate()
            .map_err(LearnerError::InvalidConfig)?;

        if self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(invalid(format!("alpha must be in (0, 1], got {}", self.alpha)));
        }

        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(invalid(format!(
                "discount_factor must be in [0, 1], got {}",
                self.discount_factor
            )));
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(invalid(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }

        let shaping = [
            ("loss_change", self.loss_change),
            ("reward_change", self.reward_change),
            ("distance_change", self.distance_change),
            ("loss_penalty", self.loss_penalty),
            ("eat_reward", self.eat_reward),
            ("move_reward", self.move_reward),
        ];
        for (name, value) in shaping {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite, got {}", name, value)));
            }
        }

        if self.max_moves_to_score == Some(0) {
            return Err(invalid("max_moves_to_score must be at least 1".to_string()));
        }

        if self.epsilon == 0.0 && self.max_moves_to_score.is_none() {
            return Err(invalid(
                "epsilon 0 needs max_moves_to_score, a greedy episode may never end".to_string(),
            ));
        }

        match self.sight_distance {
            Some(0) => return Err(invalid("sight_distance must be at least 1".to_string())),
            Some(sight) if sight > MAX_SIGHT_DISTANCE => {
                return Err(invalid(format!(
                    "sight_distance must be at most {}, got {}",
                    MAX_SIGHT_DISTANCE, sight
                )));
            }
            _ => {}
        }

        if self.view == ViewKind::Grid && self.sight_distance.is_none() {
            return Err(invalid("grid view needs a sight_distance".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> LearnerError {
    LearnerError::InvalidConfig(message)
}
