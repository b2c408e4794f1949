use std::io;

/// Errors surfaced by the learning core
///
/// Only setup and persistence can fail; a running episode never errors.
#[derive(thiserror::Error, Debug)]
pub enum LearnerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed q-table entry for state {state:?}: {reason}")]
    MalformedQTable { state: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = LearnerError> = std::result::Result<T, E>;
