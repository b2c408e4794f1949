//! Saving and loading Q-tables and training artifacts
//!
//! The Q-table is stored as a flat JSON object mapping each state key to its
//! three action values, keys sorted so two exports of the same table are
//! byte-identical. A `<name>.meta.json` sidecar records the configuration the
//! table was trained with.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::config::LearnerConfig;
use super::q_table::QTable;
use crate::error::{LearnerError, Result};
use crate::game::Snapshot;
use crate::metrics::History;

/// Metadata saved next to a Q-table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Configuration used during training
    pub config: LearnerConfig,

    /// Number of episodes in this run
    pub episodes_trained: usize,

    /// Number of states in the exported table
    pub states: usize,

    /// Highest score reached in this run
    pub best_score: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl TrainingMetadata {
    pub fn new(config: LearnerConfig, episodes_trained: usize, states: usize, best_score: usize) -> Self {
        Self {
            config,
            episodes_trained,
            states,
            best_score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Sidecar path for the table at `path`
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save a Q-table as pretty JSON, creating parent directories
pub fn save_q_table(table: &QTable, path: &Path) -> Result<()> {
    write_json(&table.to_mapping(), path)?;
    info!(states = table.len(), path = %path.display(), "q-table saved");
    Ok(())
}

/// Load a Q-table written by [`save_q_table`]
///
/// Every entry must be an array of exactly three finite numbers; the first
/// entry that is not fails the whole load.
pub fn load_q_table(path: &Path) -> Result<QTable> {
    let contents = fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&contents)?;
    let Value::Object(entries) = root else {
        return Err(LearnerError::MalformedQTable {
            state: String::new(),
            reason: "expected a JSON object at the top level".to_string(),
        });
    };

    let mut mapping = Vec::with_capacity(entries.len());
    for (state, value) in entries {
        let vector = parse_action_values(&state, value)?;
        mapping.push((state, vector));
    }

    let table = QTable::from_mapping(mapping)?;
    info!(states = table.len(), path = %path.display(), "q-table read");
    Ok(table)
}

fn parse_action_values(state: &str, value: Value) -> Result<Vec<f64>> {
    let malformed = |reason: String| LearnerError::MalformedQTable {
        state: state.to_string(),
        reason,
    };

    let items = match value {
        Value::Array(items) => items,
        other => return Err(malformed(format!("expected an array, got {}", other))),
    };
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .ok_or_else(|| malformed(format!("non-numeric action value {}", item)))
        })
        .collect()
}

/// Save the history as a JSON array of flat records
pub fn save_history(history: &History, path: &Path) -> Result<()> {
    write_json(history, path)
}

pub fn load_history(path: &Path) -> Result<History> {
    read_json(path)
}

/// Save a sequence of frames for later playback
pub fn save_replay(frames: &[Snapshot], path: &Path) -> Result<()> {
    write_json(&frames, path)
}

pub fn load_replay(path: &Path) -> Result<Vec<Snapshot>> {
    read_json(path)
}

/// Write the metadata sidecar for the table at `table_path`
pub fn save_metadata(metadata: &TrainingMetadata, table_path: &Path) -> Result<()> {
    write_json(metadata, &metadata_path(table_path))
}

/// Read the metadata sidecar for the table at `table_path`, if there is one
pub fn load_metadata(table_path: &Path) -> Result<Option<TrainingMetadata>> {
    let path = metadata_path(table_path);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
