//! Tabular Q-learning agent and episode runner
//!
//! One step: encode the board, derive the epsilon-greedy policy, sample a
//! relative turn, apply it, shape a reward, and optionally run the TD(0)
//! update. An episode repeats steps until the board is done or truncated,
//! then appends an [`EpisodeRecord`] to the history.

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::config::LearnerConfig;
use super::observation::{ViewEncoder, make_encoder};
use super::q_table::{QTable, sample_action};
use crate::error::Result;
use crate::game::{Board, RandomSource, RngSource, SnakeAction, Snapshot, block_distance};
use crate::metrics::{EpisodeRecord, History};

/// Result of a single move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub action: SnakeAction,
    pub reward: f64,
    /// Board is terminal (lost or won); truncation is not reported here
    pub done: bool,
}

/// Highest-scoring game seen so far
#[derive(Debug, Clone, PartialEq)]
pub struct BestGame {
    /// Final board of the game
    pub board: Board,
    /// Every frame from the first move, when frame recording was on
    pub frames: Vec<Snapshot>,
}

impl BestGame {
    pub fn score(&self) -> usize {
        self.board.score()
    }
}

/// Q-learning snake agent
///
/// Owns the Q-table, the history, the best game and the random source. All
/// mutation happens through `&mut self`, so a caller can stop between
/// episodes and export a consistent state.
pub struct SnakeLearner<S: RandomSource = RngSource<StdRng>> {
    config: LearnerConfig,
    encoder: Box<dyn ViewEncoder>,
    q_table: QTable,
    history: History,
    best_game: Option<BestGame>,
    record_frames: bool,
    rng: S,
}

impl<S: RandomSource> SnakeLearner<S> {
    /// Create a learner with an empty table; fails on an invalid config
    pub fn new(config: LearnerConfig, rng: S) -> Result<Self> {
        config.validate()?;

        let encoder = make_encoder(config.view, config.sight_distance);
        Ok(Self {
            config,
            encoder,
            q_table: QTable::new(),
            history: History::new(),
            best_game: None,
            record_frames: false,
            rng,
        })
    }

    /// Keep every frame of the best game for replay
    pub fn record_frames(mut self, enabled: bool) -> Self {
        self.record_frames = enabled;
        self
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn best_game(&self) -> Option<&BestGame> {
        self.best_game.as_ref()
    }

    /// Fresh random board with the configured geometry
    pub fn new_board(&mut self) -> Result<Board> {
        Board::new(self.config.board_config(), &mut self.rng)
    }

    /// Restart `board` in place using the learner's random source
    pub fn restart_board(&mut self, board: &mut Board) {
        board.restart(&mut self.rng);
    }

    /// Merge a loaded table into the current one, returns replaced states
    pub fn load_q_table(&mut self, table: QTable) -> usize {
        let loaded = table.len();
        let replaced = self.q_table.merge(table);
        if replaced > 0 {
            warn!(replaced, "loaded q-table overwrote existing states");
        }
        info!(loaded, states = self.q_table.len(), "q-table loaded");
        replaced
    }

    /// Whether the episode on `board` has ended, by termination or by
    /// running out of moves without eating
    pub fn episode_over(&self, board: &Board) -> bool {
        board.done()
            || self
                .config
                .max_moves_to_score
                .is_some_and(|limit| board.moves_since_food() >= limit)
    }

    /// Apply `action` and return the shaped reward
    ///
    /// Checked in order against the board after the move: eating, then
    /// termination, then the distance-to-food shaping term.
    pub fn reward(&mut self, board: &mut Board, action: SnakeAction) -> f64 {
        let score_before = board.score();
        board.turn(action, &mut self.rng);

        let config = &self.config;
        let new_score = board.score();
        if new_score > score_before {
            config.eat_reward * (config.reward_change * new_score as f64).exp()
        } else if board.done() {
            -config.loss_penalty * (config.loss_change * score_before as f64).exp()
        } else {
            let distance = block_distance(board.food_vector());
            config.move_reward * (-config.distance_change * distance as f64).exp()
        }
    }

    /// One epsilon-greedy step, with a TD update when `learn` is set
    pub fn make_move(&mut self, board: &mut Board, learn: bool) -> MoveOutcome {
        let state = self.encoder.encode(board);
        let probabilities = self.q_table.policy(&state, self.config.epsilon);
        let action = sample_action(&probabilities, &mut self.rng);

        let reward = self.reward(board, action);
        let done = board.done();

        if learn {
            let next_state = self.encoder.encode(board);
            self.q_table.update(
                &state,
                action,
                reward,
                &next_state,
                done,
                self.config.alpha,
                self.config.discount_factor,
            );
        }

        MoveOutcome {
            action,
            reward,
            done,
        }
    }

    /// One greedy step that leaves the table untouched
    pub fn play_move(&mut self, board: &mut Board) -> MoveOutcome {
        let state = self.encoder.encode(board);
        let action = self.q_table.greedy_action(&state);
        let reward = self.reward(board, action);

        MoveOutcome {
            action,
            reward,
            done: board.done(),
        }
    }

    /// Step `board` until the episode is over and record it
    pub fn run_episode(&mut self, board: &mut Board, learn: bool) -> EpisodeRecord {
        let mut frames = Vec::new();
        if self.record_frames {
            frames.push(board.snapshot());
        }

        let mut rewards = 0.0;
        while !self.episode_over(board) {
            let outcome = self.make_move(board, learn);
            rewards += outcome.reward;
            if self.record_frames {
                frames.push(board.snapshot());
            }
        }

        let record = EpisodeRecord::new(board.score(), board.moves(), rewards, self.q_table.len());
        debug!(
            episode = self.history.len() + 1,
            score = record.score,
            duration = record.duration,
            rewards = record.rewards,
            states = record.states,
            won = board.is_won(),
            "episode finished"
        );
        self.history.push(record.clone());

        let improved = self
            .best_game
            .as_ref()
            .is_none_or(|best| record.score > best.score());
        if improved {
            self.best_game = Some(BestGame {
                board: board.clone(),
                frames,
            });
        }

        record
    }

    /// Run one episode on a fresh board
    pub fn run_iteration(&mut self, learn: bool) -> Result<EpisodeRecord> {
        let mut board = self.new_board()?;
        Ok(self.run_episode(&mut board, learn))
    }
}
