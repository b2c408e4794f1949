use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snake_learner::modes::train::has_q_table;
use snake_learner::modes::{PlayMode, TrainConfig, TrainMode};
use snake_learner::rl::LearnerConfig;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_learner")]
#[command(version, about = "Tabular Q-learning agent for the game of Snake")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a Q-table and export it with the run history
    Train {
        /// Directory for the table, history, replay and checkpoints
        output_dir: PathBuf,

        /// Number of episodes
        #[arg(long, default_value = "10000")]
        iterations: usize,

        /// JSON file with learner hyperparameters
        #[arg(long)]
        config: Option<PathBuf>,

        /// Q-table to resume from
        #[arg(long)]
        q_table: Option<PathBuf>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Grid rows, overriding the config file
        #[arg(long)]
        rows: Option<usize>,

        /// Grid columns, overriding the config file
        #[arg(long)]
        columns: Option<usize>,

        /// Print progress every N episodes
        #[arg(long, default_value = "100")]
        log_frequency: usize,

        /// Checkpoint the table every N episodes (0 disables)
        #[arg(long, default_value = "1000")]
        checkpoint_frequency: usize,

        /// Export every frame of the best game
        #[arg(long)]
        record_best: bool,
    },

    /// Watch a learned Q-table play in the terminal
    Play {
        /// Q-table written by `train`
        q_table: PathBuf,

        /// JSON file with learner hyperparameters (defaults to the table's metadata)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for board placement
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Option<LearnerConfig>> {
    path.map(|path| {
        LearnerConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config from {:?}", path))
    })
    .transpose()
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            output_dir,
            iterations,
            config,
            q_table,
            seed,
            rows,
            columns,
            log_frequency,
            checkpoint_frequency,
            record_best,
        } => {
            init_tracing("info");

            let mut learner = load_config(config.as_deref())?.unwrap_or_default();
            if let Some(rows) = rows {
                learner.rows = rows;
            }
            if let Some(columns) = columns {
                learner.columns = columns;
            }

            if has_q_table(&output_dir) {
                warn!(dir = ?output_dir, "output directory already holds a q-table, overwriting");
            }

            let mut train_config = TrainConfig::new(iterations, output_dir);
            train_config.learner = learner;
            train_config.initial_q_table = q_table;
            train_config.seed = seed;
            train_config.log_frequency = log_frequency;
            train_config.checkpoint_frequency = checkpoint_frequency;
            train_config.record_best = record_best;

            let mut train_mode = TrainMode::new(train_config)?;

            // Ctrl+C stops after the current episode
            let stop = train_mode.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop.store(true, Ordering::SeqCst);
                }
            });

            tokio::task::spawn_blocking(move || train_mode.run())
                .await
                .context("Training task panicked")??;
        }
        Command::Play {
            q_table,
            config,
            seed,
        } => {
            // the TUI owns stderr, keep logging quiet
            init_tracing("warn");

            let config = load_config(config.as_deref())?;
            let mut play_mode = PlayMode::new(&q_table, config, seed)?;
            play_mode.run().await?;
        }
    }

    Ok(())
}
