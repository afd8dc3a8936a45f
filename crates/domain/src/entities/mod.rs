pub mod simulation_run;

// Re-export for easier access
pub use simulation_run::{RealisticReport, RunFlags, RunId, SimulationRun};
