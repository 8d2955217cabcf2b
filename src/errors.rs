//! Error types for pisum
//!
//! Every failure in a run is either fatal (computation) or recovered
//! locally (configuration). Nothing here is retried.

use thiserror::Error;

/// Main error type for a pi approximation run
#[derive(Error, Debug)]
pub enum PiError {
    /// A sub-range request could not be completed
    #[error("Transport error for range [{start}, {end}): {reason}")]
    Transport {
        start: u64,
        end: u64,
        reason: String,
    },

    /// The service answered with something that is not a decimal
    #[error("Malformed response for range [{start}, {end}): {body:?}")]
    MalformedResponse { start: u64, end: u64, body: String },

    /// A worker task panicked or was cancelled before reporting
    #[error("Worker failed: {0}")]
    WorkerFailed(String),

    /// The iteration bound was reached before the error estimate fell below threshold
    #[error("Failed to converge after {iterations} iterations (last delta {delta})")]
    NotConverged { iterations: u64, delta: String },

    /// Partition preconditions violated
    #[error("Invalid partition: step {step} over {workers} workers")]
    InvalidPartition { step: u64, workers: usize },

    /// Division by a zero denominator
    #[error("Division by zero")]
    DivisionByZero,

    /// Run state machine errors
    #[error("Invalid state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PiError {
    /// True for failures of a single sub-range evaluation
    pub fn is_computation_error(&self) -> bool {
        matches!(
            self,
            PiError::Transport { .. } | PiError::MalformedResponse { .. } | PiError::WorkerFailed(_)
        )
    }
}

/// Result type alias for pisum operations
pub type Result<T> = std::result::Result<T, PiError>;
