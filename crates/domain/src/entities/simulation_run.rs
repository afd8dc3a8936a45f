use crate::enums::StrategyId;
use crate::error::DomainError;
use crate::value_objects::{BalanceSequence, SimulationOutcome, SimulationRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Counters reported when realistic conditions were simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealisticReport {
    pub network_errors: u32,
    pub total_delay: f64,
    pub bet_limit_hits: u32,
}

/// Flags reported by the simulator for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFlags {
    pub ruin_occurred: bool,
    pub target_reached: bool,
    pub max_loss_streak: Option<u32>,
    pub realistic: Option<RealisticReport>,
}

/// One completed simulation, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub id: RunId,
    pub strategy: StrategyId,
    pub request: SimulationRequest,
    pub balances: BalanceSequence,
    pub final_balance: f64,
    pub flags: RunFlags,
    pub created_at: DateTime<Utc>,
}

impl SimulationRun {
    /// Builds a run from a successful simulator response.
    ///
    /// # Errors
    /// Returns a `DomainError` when the reported history is empty or holds
    /// non-finite values, or when `final_balance` is not finite.
    pub fn from_outcome(
        request: SimulationRequest,
        outcome: SimulationOutcome,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let balances = BalanceSequence::new(outcome.history)?;
        if !outcome.final_balance.is_finite() {
            return Err(DomainError::InvalidParameter {
                field: "final_balance",
                reason: format!("must be finite, got {}", outcome.final_balance),
            });
        }

        let has_realistic = outcome.network_errors.is_some()
            || outcome.total_delay.is_some()
            || outcome.bet_limit_hits.is_some();
        let realistic = has_realistic.then(|| RealisticReport {
            network_errors: outcome.network_errors.unwrap_or(0),
            total_delay: outcome.total_delay.unwrap_or(0.0),
            bet_limit_hits: outcome.bet_limit_hits.unwrap_or(0),
        });

        Ok(Self {
            id: RunId::new(),
            strategy: request.strategy(),
            request,
            balances,
            final_balance: outcome.final_balance,
            flags: RunFlags {
                ruin_occurred: outcome.ruin_occurred,
                target_reached: outcome.target_reached,
                max_loss_streak: outcome.max_loss_streak,
                realistic,
            },
            created_at,
        })
    }

    /// Rounds actually completed.
    #[must_use]
    pub fn rounds_completed(&self) -> usize {
        self.balances.len()
    }

    /// Starting bankroll this run was requested with.
    #[must_use]
    pub fn starting_bankroll(&self) -> f64 {
        self.request.shared.bankroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{SharedParameters, StrategyPayload};

    fn outcome(history: Vec<f64>) -> SimulationOutcome {
        let final_balance = history.last().copied().unwrap_or(0.0);
        SimulationOutcome {
            history,
            final_balance,
            max_loss_streak: Some(2),
            ruin_occurred: false,
            target_reached: false,
            network_errors: None,
            total_delay: None,
            bet_limit_hits: None,
        }
    }

    fn request() -> SimulationRequest {
        SimulationRequest::new(SharedParameters::default(), StrategyPayload::Paroli)
    }

    #[test]
    fn test_from_outcome() {
        let run =
            SimulationRun::from_outcome(request(), outcome(vec![101.0, 99.0]), Utc::now()).unwrap();
        assert_eq!(run.strategy, StrategyId::Paroli);
        assert_eq!(run.final_balance, 99.0);
        assert_eq!(run.rounds_completed(), 2);
        assert_eq!(run.flags.max_loss_streak, Some(2));
        assert!(run.flags.realistic.is_none());
    }

    #[test]
    fn test_empty_history_rejected() {
        let err = SimulationRun::from_outcome(request(), outcome(vec![]), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::EmptySequence);
    }

    #[test]
    fn test_partial_realistic_counters_default_to_zero() {
        let mut raw = outcome(vec![100.0]);
        raw.network_errors = Some(4);
        let run = SimulationRun::from_outcome(request(), raw, Utc::now()).unwrap();
        assert_eq!(
            run.flags.realistic,
            Some(RealisticReport {
                network_errors: 4,
                total_delay: 0.0,
                bet_limit_hits: 0,
            })
        );
    }
}
