//! Simulator client, single-run sessions and strategy comparison.
//!
//! This crate provides:
//! - The `SimulationBackend` seam and its HTTP implementation
//! - `SimulationSession` for one strategy at a time
//! - `ComparisonRunner` for batches under shared parameters
//! - Chart and metric projections of the results

/// Simulator client.
pub mod backend;
/// Comparison batches.
pub mod comparison;
/// Simulator connection settings.
pub mod config;
/// Error types.
pub mod error;
/// Prelude.
pub mod prelude;
/// Chart and metric projections.
pub mod projection;
/// Single-run flow.
pub mod session;
