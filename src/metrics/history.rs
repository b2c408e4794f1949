//! Per-episode training history
//!
//! Records are appended once per finished episode and never changed
//! afterwards. Aggregates return `None` on an empty history instead of
//! failing.

use serde::{Deserialize, Serialize};

/// Summary of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Snake length at the end of the episode
    pub score: usize,
    /// Moves made in the episode
    pub duration: usize,
    /// Sum of the rewards received
    pub rewards: f64,
    /// Q-table size once the episode ended
    pub states: usize,
    /// Score per move
    pub velocity: f64,
}

impl EpisodeRecord {
    pub fn new(score: usize, duration: usize, rewards: f64, states: usize) -> Self {
        let velocity = if duration == 0 {
            0.0
        } else {
            score as f64 / duration as f64
        };
        Self {
            score,
            duration,
            rewards,
            states,
            velocity,
        }
    }

    pub fn field(&self, field: HistoryField) -> f64 {
        match field {
            HistoryField::Score => self.score as f64,
            HistoryField::Duration => self.duration as f64,
            HistoryField::Rewards => self.rewards,
            HistoryField::States => self.states as f64,
            HistoryField::Velocity => self.velocity,
        }
    }
}

/// Named column of an [`EpisodeRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryField {
    Score,
    Duration,
    Rewards,
    States,
    Velocity,
}

impl HistoryField {
    pub const ALL: [HistoryField; 5] = [
        HistoryField::Score,
        HistoryField::Duration,
        HistoryField::Rewards,
        HistoryField::States,
        HistoryField::Velocity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HistoryField::Score => "score",
            HistoryField::Duration => "duration",
            HistoryField::Rewards => "rewards",
            HistoryField::States => "states",
            HistoryField::Velocity => "velocity",
        }
    }
}

/// Append-only sequence of episode records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<EpisodeRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EpisodeRecord> {
        self.records.last()
    }

    /// One column, in episode order
    pub fn values(&self, field: HistoryField) -> Vec<f64> {
        self.records.iter().map(|record| record.field(field)).collect()
    }

    /// Largest value of `field` over the whole history
    pub fn max(&self, field: HistoryField) -> Option<f64> {
        self.records
            .iter()
            .map(|record| record.field(field))
            .reduce(f64::max)
    }

    /// Mean of `field` over the last `last_n` records
    ///
    /// A window longer than the history covers all of it.
    pub fn mean(&self, field: HistoryField, last_n: usize) -> Option<f64> {
        if self.records.is_empty() || last_n == 0 {
            return None;
        }
        let window = &self.records[self.records.len().saturating_sub(last_n)..];
        let sum: f64 = window.iter().map(|record| record.field(field)).sum();
        Some(sum / window.len() as f64)
    }
}

/// Running maximum of `values`
pub fn moving_max(values: &[f64]) -> Vec<f64> {
    let mut best = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            if value > best {
                best = value;
            }
            best
        })
        .collect()
}

/// Mean of every full window of `n` consecutive values
///
/// Yields `values.len() - n + 1` points; empty when `n` is zero or longer
/// than `values`.
pub fn moving_mean(values: &[f64], n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    values
        .windows(n)
        .map(|window| window.iter().sum::<f64>() / n as f64)
        .collect()
}
