use serde::{Deserialize, Serialize};

/// Successful simulator response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Balance after each completed round.
    pub history: Vec<f64>,
    /// Balance when the run ended.
    pub final_balance: f64,
    /// Longest losing run, when the strategy tracks it.
    #[serde(default)]
    pub max_loss_streak: Option<u32>,
    /// The bankroll could no longer cover a stake.
    #[serde(default)]
    pub ruin_occurred: bool,
    /// The run stopped because its profit goal was met.
    #[serde(default)]
    pub target_reached: bool,
    /// Injected connection errors (realistic conditions only).
    #[serde(default)]
    pub network_errors: Option<u32>,
    /// Total simulated latency in seconds (realistic conditions only).
    #[serde(default)]
    pub total_delay: Option<f64>,
    /// Stakes clamped by table limits (realistic conditions only).
    #[serde(default)]
    pub bet_limit_hits: Option<u32>,
}

/// Raw `/simulate` reply: either an error indicator or an outcome.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SimulationReply {
    /// The simulator refused or failed the request.
    Failure {
        /// Message reported by the simulator.
        error: String,
    },
    /// The simulation completed.
    Success(SimulationOutcome),
}
