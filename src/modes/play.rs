//! Play mode for watching a learned Q-table
//!
//! Loads a saved table and steps boards with the greedy policy in a TUI. The
//! table is never updated here. A finished episode stays on screen for one
//! tick, then the board restarts.
//!
//! # Controls
//!
//! - Space/P: Pause/unpause
//! - N: Single step while paused
//! - R: Restart the board
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Stderr, stderr},
    path::Path,
    time::Duration,
};
use tokio::time::{Interval, interval};
use tracing::info;

use crate::game::{Board, RngSource};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{PlayStatus, Renderer};
use crate::rl::persistence::{load_metadata, load_q_table};
use crate::rl::{LearnerConfig, SnakeLearner};

/// Playback speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSpeed {
    /// 2 Hz (500ms per move)
    Slow,
    /// 8 Hz (125ms per move)
    Normal,
    /// 20 Hz (50ms per move)
    Fast,
    /// 60 Hz (16ms per move)
    VeryFast,
}

impl PlaybackSpeed {
    pub fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Greedy playback of a learned table
pub struct PlayMode {
    learner: SnakeLearner,
    board: Board,
    renderer: Renderer,
    input: InputHandler,
    metrics: GameMetrics,
    should_quit: bool,
    paused: bool,
    speed: PlaybackSpeed,
    /// Current episode, starting at 1
    episode: usize,
    /// The current board has reached the end of its episode
    finished: bool,
}

impl PlayMode {
    /// Load the table at `q_table_path` and set up a first board
    ///
    /// Without an explicit `config`, the training metadata next to the table
    /// is used, then the defaults. Greedy play can cycle forever, so a move
    /// limit of twice the board size is applied when the config sets none.
    pub fn new(q_table_path: &Path, config: Option<LearnerConfig>, seed: Option<u64>) -> Result<Self> {
        let table = load_q_table(q_table_path)
            .with_context(|| format!("Failed to load q-table from {:?}", q_table_path))?;

        let mut config = match config {
            Some(config) => config,
            None => load_metadata(q_table_path)
                .with_context(|| format!("Failed to read metadata for {:?}", q_table_path))?
                .map(|metadata| metadata.config)
                .unwrap_or_default(),
        };
        if config.max_moves_to_score.is_none() {
            config.max_moves_to_score = Some(config.rows * config.columns * 2);
        }

        let rng = match seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        };
        let mut learner = SnakeLearner::new(config, rng).context("Invalid learner configuration")?;
        learner.load_q_table(table);
        let board = learner.new_board().context("Failed to create board")?;

        info!(
            states = learner.q_table().len(),
            rows = learner.config().rows,
            columns = learner.config().columns,
            "starting playback"
        );

        Ok(Self {
            learner,
            board,
            renderer: Renderer::new(),
            input: InputHandler::new(),
            metrics: GameMetrics::new(),
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Normal,
            episode: 1,
            finished: false,
        })
    }

    /// Set up the terminal, run the playback loop, restore the terminal
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_playback_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_playback_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.advance();
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let snapshot = self.board.snapshot();
                    let status = self.status();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &status, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// One tick: a greedy move, or a restart once the episode is over
    pub fn advance(&mut self) {
        if self.finished {
            self.restart();
            return;
        }

        self.learner.play_move(&mut self.board);
        if self.learner.episode_over(&self.board) {
            self.finished = true;
            self.metrics
                .on_game_over(self.board.score(), self.board.is_won());
        }
    }

    fn restart(&mut self) {
        self.learner.restart_board(&mut self.board);
        self.finished = false;
        self.episode += 1;
        self.metrics.on_game_start();
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input.handle_key_event(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::TogglePause => self.paused = !self.paused,
            KeyAction::Step => {
                if self.paused {
                    self.advance();
                }
            }
            KeyAction::Restart => self.restart(),
            KeyAction::Speed(speed) => {
                self.speed = speed;
                tick_timer.reset_after(speed.tick_interval());
            }
            KeyAction::None => {}
        }
    }

    fn status(&self) -> PlayStatus {
        PlayStatus {
            episode: self.episode,
            paused: self.paused,
            speed: self.speed.as_str(),
            finished: self.finished,
            won: self.board.is_won(),
        }
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
