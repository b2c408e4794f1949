//! Rolling training statistics for progress reports
//!
//! Every number is read from the learner's [`History`], so the progress line
//! and the exported history never disagree.

use super::history::{History, HistoryField};

/// Fields averaged in the progress line, in print order
const SUMMARY_FIELDS: [HistoryField; 4] = [
    HistoryField::Rewards,
    HistoryField::Score,
    HistoryField::Duration,
    HistoryField::Velocity,
];

/// Rolling-window view over a [`History`]
///
/// # Example
///
/// ```rust
/// use snake_learner::metrics::{EpisodeRecord, History, TrainingStats};
///
/// let mut history = History::new();
/// history.push(EpisodeRecord::new(5, 150, 15.5, 40));
///
/// let stats = TrainingStats::new(100);
/// println!("{}", stats.format_summary(&history));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingStats {
    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a view that averages over the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Mean of `field` over the rolling window, 0.0 when empty
    pub fn mean(&self, history: &History, field: HistoryField) -> f64 {
        history.mean(field, self.window_size).unwrap_or(0.0)
    }

    /// Total number of moves made
    pub fn total_steps(&self, history: &History) -> usize {
        history.records().iter().map(|record| record.duration).sum()
    }

    /// Best score over the whole history, 0 when empty
    pub fn best_score(&self, history: &History) -> usize {
        history
            .records()
            .iter()
            .map(|record| record.score)
            .max()
            .unwrap_or(0)
    }

    /// One-line summary of the current statistics
    ///
    /// `episodes: 1 | steps: 150 | rewards: 15.50 | score: 5.00 | duration: 150.00 | velocity: 0.03 | states: 40 | best: 5`
    pub fn format_summary(&self, history: &History) -> String {
        let mut parts = vec![
            format!("episodes: {}", history.len()),
            format!("steps: {}", self.total_steps(history)),
        ];
        for field in SUMMARY_FIELDS {
            parts.push(format!("{}: {:.2}", field.name(), self.mean(history, field)));
        }
        let states = history.last().map_or(0, |record| record.states);
        parts.push(format!("states: {}", states));
        parts.push(format!("best: {}", self.best_score(history)));

        parts.join(" | ")
    }
}
