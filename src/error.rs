//! Error types for the screening engine
//!
//! Scoring itself never fails: malformed attributes are defaulted by the
//! normalizer. These errors only come from the edges (JSON ingestion,
//! calibration loading, and the task-list collaborator).

use thiserror::Error;

/// Errors that can occur around a scoring run
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Failed to parse screening input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Failed to fetch tasks: {0}")]
    UpstreamFetch(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
