//! Prelude module for convenient imports.
//!
//! ```rust
//! use aviator_simulation::prelude::*;
//! ```

// Simulator client
pub use crate::backend::{HttpSimulator, SimulationBackend};
pub use crate::config::SimulatorConfig;

// Errors
pub use crate::error::{ComparisonError, SessionError, SimulationError};

// Single runs
pub use crate::session::{RunReport, SimulationSession};

// Comparison
pub use crate::comparison::{
    BatchParameters, ComparisonBatch, ComparisonRunner, StrategyFailure,
};

// Projections
pub use crate::projection::{
    BalanceChart, Bar, Metric, MetricComparison, MetricGroup, Series, run_chart,
};
