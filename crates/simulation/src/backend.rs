//! Client side of the external simulator.

use crate::config::SimulatorConfig;
use crate::error::SimulationError;
use async_trait::async_trait;
use aviator_domain::value_objects::{SimulationOutcome, SimulationReply, SimulationRequest};
use std::time::Duration;
use tracing::debug;

/// Anything that can run one simulation request.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    /// Runs `request` and returns the simulator's outcome.
    async fn simulate(&self, request: &SimulationRequest)
    -> Result<SimulationOutcome, SimulationError>;
}

/// Calls the simulator's HTTP `/simulate` endpoint.
pub struct HttpSimulator {
    client: reqwest::Client,
    config: SimulatorConfig,
}

impl HttpSimulator {
    /// Creates a client with the configured timeout.
    ///
    /// # Errors
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SimulationError::Transport)?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

/// Interprets a raw reply body.
pub(crate) fn decode_reply(
    status: u16,
    body: &str,
) -> Result<SimulationOutcome, SimulationError> {
    let reply: SimulationReply = match serde_json::from_str(body) {
        Ok(reply) => reply,
        Err(_) if !(200..300).contains(&status) => {
            return Err(SimulationError::HttpStatus { status });
        }
        Err(e) => return Err(SimulationError::MalformedResponse(e.to_string())),
    };
    match reply {
        SimulationReply::Failure { error } => Err(SimulationError::Backend(error)),
        SimulationReply::Success(outcome) => Ok(outcome),
    }
}

#[async_trait]
impl SimulationBackend for HttpSimulator {
    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationOutcome, SimulationError> {
        request.validate().map_err(SimulationError::InvalidRequest)?;

        let url = self.config.simulate_url();
        let query = request.query_pairs();
        debug!(strategy = %request.strategy(), url = %url, "Requesting simulation");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(SimulationError::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(SimulationError::Transport)?;

        let outcome = decode_reply(status, &body)?;
        debug!(
            strategy = %request.strategy(),
            rounds = outcome.history.len(),
            final_balance = outcome.final_balance,
            "Simulation completed"
        );
        Ok(outcome)
    }
}
