//! Core types for the Aviator strategy lab.
//!
//! - Strategy identifiers and the tagged simulation request
//! - Simulator response shape and the immutable `SimulationRun`
//! - Balance statistics (drawdown, streaks, win rate, ROI, bands)

pub mod entities;
pub mod enums;
pub mod error;
pub mod metrics;
pub mod value_objects;

pub use entities::{RunId, SimulationRun};
pub use enums::{ProgressionType, StrategyId};
pub use error::DomainError;
pub use metrics::{DerivedStats, StatsError, compute_stats};
