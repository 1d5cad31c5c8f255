//! Error types for Tash Desk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TashError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Case {id} was modified by another editor (rev {actual}, expected {expected})")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Store error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl TashError {
    /// True when the caller should re-fetch the document and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, TashError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, TashError>;
