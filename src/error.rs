//! Error types for the gaze smoothing library.

use crate::types::SubjectId;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Smoothing weights or window configuration rejected
    #[error("Weighting error: {0}")]
    WeightingError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Replay session could not be loaded
    #[error("Replay error: {0}")]
    ReplayError(String),

    /// The pipeline is shutting down and accepts no new frames
    #[error("Shutdown requested")]
    ShutdownRequested,

    /// The frame processing thread panicked
    #[error("Worker thread panicked")]
    WorkerPanicked,

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Failure reported by a head-pose lookup.
///
/// Every variant is transient: the subject is skipped for the current frame
/// and the next frame is evaluated independently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No head pose has been observed for the subject yet
    #[error("no head pose available for subject {0}")]
    NotAvailable(SubjectId),

    /// Answering the query would require extrapolating past known data
    #[error("extrapolation required: {0}")]
    Extrapolation(String),

    /// The transform service cannot be reached
    #[error("connectivity lost: {0}")]
    ConnectivityLost(String),
}

/// Failure reported by a publisher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The topic or sink has been closed
    #[error("publish() to a closed topic: {0}")]
    ChannelClosed(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
