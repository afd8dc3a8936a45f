//! Error types for simulator calls, single runs and comparison batches.

use crate::comparison::ComparisonBatch;
use aviator_data::HistoryError;
use aviator_domain::{DomainError, StrategyId};
use thiserror::Error;

/// Errors from one simulator call.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The request failed validation; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] DomainError),

    /// The simulator could not be reached.
    #[error("Failed to connect to backend.")]
    Transport(#[source] reqwest::Error),

    /// The simulator answered with an error indicator.
    #[error("{0}")]
    Backend(String),

    /// Non-JSON reply with a non-success status.
    #[error("simulator returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The reply was not the expected JSON shape.
    #[error("malformed simulator response: {0}")]
    MalformedResponse(String),

    /// The reply decoded but its contents are unusable.
    #[error("invalid simulator response: {0}")]
    InvalidResponse(#[from] DomainError),
}

/// Errors from a single-run simulation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("failed to record run: {0}")]
    History(#[from] HistoryError),
}

/// Errors that abort a comparison batch.
///
/// Per-strategy simulator failures never appear here; they are collected in
/// the batch instead.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("select at least one strategy to compare")]
    EmptySelection,

    #[error("strategy `{0}` selected more than once")]
    DuplicateStrategy(StrategyId),

    #[error("the custom strategy is selected but its parameters are missing")]
    MissingCustomParameters,

    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] DomainError),

    /// The batch ran but not every run reached history.
    ///
    /// `batch.runs[..recorded]` were persisted; the rest were not.
    #[error("recorded {recorded} of {} runs before history failed: {source}", .batch.runs.len())]
    History {
        recorded: usize,
        batch: Box<ComparisonBatch>,
        source: HistoryError,
    },
}
