//! Training mode for the Q-learning agent
//!
//! Runs episodes with TD updates, prints rolling progress, checkpoints the
//! Q-table and exports the table, the history, the best game and the run
//! metadata to an output directory. Training can be stopped between episodes
//! through [`TrainMode::stop_handle`]; whatever has been learned so far is
//! still exported.
//!
//! # Example
//!
//! ```rust,no_run
//! use snake_learner::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(10_000, PathBuf::from("runs/default"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::game::RngSource;
use crate::metrics::TrainingStats;
use crate::rl::persistence::{
    load_q_table, save_history, save_metadata, save_q_table, save_replay,
};
use crate::rl::{LearnerConfig, SnakeLearner, TrainingMetadata};

pub const Q_TABLE_FILE: &str = "q_table.json";
pub const HISTORY_FILE: &str = "history.json";
pub const BEST_GAME_FILE: &str = "best_game.json";

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub iterations: usize,

    /// Directory receiving every exported file
    pub output_dir: PathBuf,

    /// Save a checkpoint every N episodes (0 disables checkpoints)
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Keep every frame of the best game and export it
    pub record_best: bool,

    /// Seed for a reproducible run; entropy when absent
    pub seed: Option<u64>,

    /// Table to resume from
    pub initial_q_table: Option<PathBuf>,

    /// Learner hyperparameters
    pub learner: LearnerConfig,
}

impl TrainConfig {
    pub fn new(iterations: usize, output_dir: PathBuf) -> Self {
        Self {
            iterations,
            output_dir,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            record_best: false,
            seed: None,
            initial_q_table: None,
            learner: LearnerConfig::default(),
        }
    }
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    learner: SnakeLearner,

    /// Rolling window for progress lines
    stats: TrainingStats,

    config: TrainConfig,

    /// Set from outside to stop after the current episode
    stop: Arc<AtomicBool>,
}

impl TrainMode {
    /// Build the learner, merging in the initial table if one is given
    pub fn new(config: TrainConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        };
        let mut learner = SnakeLearner::new(config.learner.clone(), rng)
            .context("Invalid learner configuration")?
            .record_frames(config.record_best);

        if let Some(path) = &config.initial_q_table {
            let table = load_q_table(path)
                .with_context(|| format!("Failed to load q-table from {:?}", path))?;
            learner.load_q_table(table);
        }

        // Progress lines average the last 100 episodes
        let stats = TrainingStats::new(100);

        Ok(Self {
            learner,
            stats,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends training after the episode in progress
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn learner(&self) -> &SnakeLearner {
        &self.learner
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Run the training loop, then export everything
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for episode in 0..self.config.iterations {
            if self.stop.load(Ordering::SeqCst) {
                warn!(completed = episode, "training interrupted");
                println!("\nInterrupted after {} episodes", episode);
                break;
            }

            self.learner
                .run_iteration(true)
                .context("Failed to start episode")?;

            if self.config.log_frequency > 0 && (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1);
            }

            if self.config.checkpoint_frequency > 0
                && (episode + 1) % self.config.checkpoint_frequency == 0
            {
                self.save_checkpoint(episode + 1)?;
            }
        }

        self.export()?;

        println!("\nTraining complete!");
        println!("Results saved to: {:?}", self.config.output_dir);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary(self.learner.history()));

        Ok(())
    }

    /// Path of a file inside the output directory
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    fn save_checkpoint(&self, episode: usize) -> Result<()> {
        let checkpoint_path = self
            .config
            .output_dir
            .join("checkpoints")
            .join(format!("q_table_ep{}.json", episode));

        save_q_table(self.learner.q_table(), &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        println!("  Checkpoint saved: {:?}", checkpoint_path);

        Ok(())
    }

    /// Write the table, its metadata, the history and the best replay
    pub fn export(&self) -> Result<()> {
        let q_table_path = self.output_path(Q_TABLE_FILE);
        save_q_table(self.learner.q_table(), &q_table_path)
            .with_context(|| format!("Failed to save q-table to {:?}", q_table_path))?;

        let metadata = TrainingMetadata::new(
            self.learner.config().clone(),
            self.learner.history().len(),
            self.learner.q_table().len(),
            self.learner.best_game().map_or(0, |best| best.score()),
        );
        save_metadata(&metadata, &q_table_path).context("Failed to save training metadata")?;

        let history_path = self.output_path(HISTORY_FILE);
        save_history(self.learner.history(), &history_path)
            .with_context(|| format!("Failed to save history to {:?}", history_path))?;

        if let Some(best) = self.learner.best_game().filter(|best| !best.frames.is_empty()) {
            let replay_path = self.output_path(BEST_GAME_FILE);
            save_replay(&best.frames, &replay_path)
                .with_context(|| format!("Failed to save replay to {:?}", replay_path))?;
            info!(score = best.score(), frames = best.frames.len(), "best game saved");
        }

        Ok(())
    }

    fn print_header(&self) {
        let learner = &self.config.learner;
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.iterations);
        println!(
            "Board: {}x{} grid, initial length {}",
            learner.rows, learner.columns, learner.initial_length
        );
        println!("Learner Config:");
        println!("  Alpha: {}", learner.alpha);
        println!("  Discount factor: {}", learner.discount_factor);
        println!("  Epsilon: {}", learner.epsilon);
        println!("  View: {:?} (sight {:?})", learner.view, learner.sight_distance);
        println!(
            "  Rewards: eat {} (x{}), loss {} (x{}), move {} (x{})",
            learner.eat_reward,
            learner.reward_change,
            learner.loss_penalty,
            learner.loss_change,
            learner.move_reward,
            learner.distance_change
        );
        if let Some(limit) = learner.max_moves_to_score {
            println!("  Max moves to score: {}", limit);
        }
        if !self.learner.q_table().is_empty() {
            println!("Resuming with {} states", self.learner.q_table().len());
        }
        println!("Checkpoints: Every {} episodes", self.config.checkpoint_frequency);
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Output directory: {:?}", self.config.output_dir);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {}",
            episode,
            self.config.iterations,
            self.stats.format_summary(self.learner.history())
        );
    }
}

/// Whether `dir` already holds a trained table
pub fn has_q_table(dir: &Path) -> bool {
    dir.join(Q_TABLE_FILE).exists()
}
