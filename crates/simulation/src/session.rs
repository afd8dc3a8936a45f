use crate::backend::SimulationBackend;
use crate::error::{SessionError, SimulationError};
use aviator_data::{HistoryStore, KeyValueStorage};
use aviator_domain::metrics::{DerivedStats, StatsError, compute_stats};
use aviator_domain::value_objects::SimulationRequest;
use aviator_domain::SimulationRun;
use chrono::Utc;
use tracing::{info, warn};

/// A completed run paired with its statistics.
///
/// A stats failure does not invalidate the run, so the result is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run: SimulationRun,
    pub stats: Result<DerivedStats, StatsError>,
}

impl RunReport {
    /// Derives statistics for `run` against its own starting bankroll.
    #[must_use]
    pub fn summarize(run: SimulationRun) -> Self {
        let stats = compute_stats(&run.balances, run.starting_bankroll());
        Self { run, stats }
    }

    /// Statistics, if they could be computed.
    #[must_use]
    pub fn stats(&self) -> Option<&DerivedStats> {
        self.stats.as_ref().ok()
    }
}

/// Single-strategy simulation flow.
///
/// Holds the most recent result, or the message of the most recent failure.
pub struct SimulationSession<B: SimulationBackend> {
    backend: B,
    current: Option<RunReport>,
    last_error: Option<String>,
}

impl<B: SimulationBackend> SimulationSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            last_error: None,
        }
    }

    /// Runs one simulation and records it in `history`.
    ///
    /// On failure the previous result is cleared and the error message kept.
    ///
    /// # Errors
    /// Returns the simulator failure, or a history error if the run could not
    /// be persisted. In the latter case the run is still the current result.
    pub async fn simulate<S: KeyValueStorage>(
        &mut self,
        request: SimulationRequest,
        history: &mut HistoryStore<S>,
    ) -> Result<&RunReport, SessionError> {
        let run = match self.fetch(request).await {
            Ok(run) => run,
            Err(e) => {
                warn!(error = %e, "Simulation failed");
                self.current = None;
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let report = RunReport::summarize(run);
        info!(
            strategy = %report.run.strategy,
            final_balance = report.run.final_balance,
            rounds = report.run.rounds_completed(),
            "Simulation stored"
        );
        self.last_error = None;
        let current = self.current.insert(report);

        if let Err(e) = history.append(current.run.clone()) {
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }
        Ok(current)
    }

    async fn fetch(&self, request: SimulationRequest) -> Result<SimulationRun, SimulationError> {
        request.validate().map_err(SimulationError::InvalidRequest)?;
        let outcome = self.backend.simulate(&request).await?;
        Ok(SimulationRun::from_outcome(request, outcome, Utc::now())?)
    }

    /// Most recent successful result.
    #[must_use]
    pub fn current(&self) -> Option<&RunReport> {
        self.current.as_ref()
    }

    /// Message of the most recent failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::ScriptedBackend;
    use aviator_data::MemoryStorage;
    use aviator_domain::StrategyId;
    use aviator_domain::value_objects::{SharedParameters, StrategyPayload};

    fn request(payload: StrategyPayload) -> SimulationRequest {
        SimulationRequest::new(SharedParameters::new(1.0, 4, 100.0), payload)
    }

    #[tokio::test]
    async fn test_success_stores_result_and_history() {
        let backend = ScriptedBackend::new().succeed(StrategyId::Paroli, vec![100.0, 102.0, 99.0]);
        let mut session = SimulationSession::new(backend);
        let mut history = HistoryStore::open(MemoryStorage::new()).unwrap();

        let report = session
            .simulate(request(StrategyPayload::Paroli), &mut history)
            .await
            .unwrap();
        assert_eq!(report.run.final_balance, 99.0);
        let stats = report.stats().unwrap();
        assert_eq!(stats.max_win_streak, 1);
        assert_eq!(stats.roi, -1.0);

        assert_eq!(history.len(), 1);
        assert!(session.current().is_some());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failure_clears_previous_result() {
        let backend = ScriptedBackend::new()
            .succeed(StrategyId::Paroli, vec![100.0, 101.0])
            .fail(StrategyId::Martingale, "Invalid strategy");
        let mut session = SimulationSession::new(backend);
        let mut history = HistoryStore::open(MemoryStorage::new()).unwrap();

        session
            .simulate(request(StrategyPayload::Paroli), &mut history)
            .await
            .unwrap();
        let err = session
            .simulate(request(StrategyPayload::Martingale), &mut history)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Simulation(SimulationError::Backend(_))
        ));
        assert!(session.current().is_none());
        assert_eq!(session.last_error(), Some("Invalid strategy"));
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        let mut session = SimulationSession::new(ScriptedBackend::new());
        let mut history = HistoryStore::open(MemoryStorage::new()).unwrap();
        let bad = SimulationRequest::new(
            SharedParameters::new(1.0, 0, 100.0),
            StrategyPayload::Paroli,
        );

        assert!(session.simulate(bad, &mut history).await.is_err());
        assert!(session.backend().calls().is_empty());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_stats_failure_keeps_run() {
        let backend = ScriptedBackend::new().succeed(StrategyId::Early, vec![0.0, -1.0, 2.0]);
        let mut session = SimulationSession::new(backend);
        let mut history = HistoryStore::open(MemoryStorage::new()).unwrap();

        let report = session
            .simulate(request(StrategyPayload::Early), &mut history)
            .await
            .unwrap();
        assert!(matches!(report.stats, Err(StatsError::NonPositivePeak { .. })));
        assert_eq!(history.len(), 1);
    }
}
