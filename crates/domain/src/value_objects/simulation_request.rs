//! Tagged simulation request.
//!
//! A request is the shared parameter block plus exactly one strategy payload,
//! so strategy-specific fields can only appear next to the strategy that
//! reads them.

use crate::enums::StrategyId;
use crate::error::DomainError;
use crate::value_objects::parameters::{CustomStrategy, SharedParameters};
use serde::{Deserialize, Serialize};

/// Strategy selection with the fields only that strategy uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyPayload {
    /// Early cash-out.
    Early,
    /// Mid-risk cash-out.
    Mid,
    /// High-risk cash-out.
    High,
    /// Dual bet.
    Dual,
    /// Martingale progression.
    Martingale,
    /// Paroli progression.
    Paroli,
    /// Percentage-of-bankroll staking.
    FixedPercent {
        /// Stake as a percentage of the current balance.
        percent_bet: f64,
    },
    /// Flat staking until the profit goal is reached.
    TargetProfit {
        /// Profit at which the run stops.
        target_profit: f64,
    },
    /// User-defined strategy.
    Custom(CustomStrategy),
}

impl StrategyPayload {
    /// Builds the payload for `strategy`, picking the strategy-specific
    /// value out of the supplied candidates.
    ///
    /// # Errors
    /// Returns `InvalidParameter` when `strategy` is `custom` and no custom
    /// fields were supplied.
    pub fn for_strategy(
        strategy: StrategyId,
        percent_bet: f64,
        target_profit: f64,
        custom: Option<&CustomStrategy>,
    ) -> Result<Self, DomainError> {
        Ok(match strategy {
            StrategyId::Early => StrategyPayload::Early,
            StrategyId::Mid => StrategyPayload::Mid,
            StrategyId::High => StrategyPayload::High,
            StrategyId::Dual => StrategyPayload::Dual,
            StrategyId::Martingale => StrategyPayload::Martingale,
            StrategyId::Paroli => StrategyPayload::Paroli,
            StrategyId::FixedPercent => StrategyPayload::FixedPercent { percent_bet },
            StrategyId::TargetProfit => StrategyPayload::TargetProfit { target_profit },
            StrategyId::Custom => StrategyPayload::Custom(
                custom
                    .cloned()
                    .ok_or_else(|| DomainError::invalid("custom", "custom strategy fields are required"))?,
            ),
        })
    }

    /// Identifier of the selected strategy.
    #[must_use]
    pub fn strategy(&self) -> StrategyId {
        match self {
            StrategyPayload::Early => StrategyId::Early,
            StrategyPayload::Mid => StrategyId::Mid,
            StrategyPayload::High => StrategyId::High,
            StrategyPayload::Dual => StrategyId::Dual,
            StrategyPayload::Martingale => StrategyId::Martingale,
            StrategyPayload::Paroli => StrategyId::Paroli,
            StrategyPayload::FixedPercent { .. } => StrategyId::FixedPercent,
            StrategyPayload::TargetProfit { .. } => StrategyId::TargetProfit,
            StrategyPayload::Custom(_) => StrategyId::Custom,
        }
    }

    /// Checks the strategy-specific fields.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the bad field.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            StrategyPayload::FixedPercent { percent_bet } => {
                if !percent_bet.is_finite() || *percent_bet <= 0.0 || *percent_bet > 100.0 {
                    return Err(DomainError::invalid(
                        "percent_bet",
                        format!("must be in (0, 100], got {percent_bet}"),
                    ));
                }
                Ok(())
            }
            StrategyPayload::TargetProfit { target_profit } => {
                if !target_profit.is_finite() || *target_profit <= 0.0 {
                    return Err(DomainError::invalid(
                        "target_profit",
                        format!("must be a positive number, got {target_profit}"),
                    ));
                }
                Ok(())
            }
            StrategyPayload::Custom(custom) => custom.validate(),
            _ => Ok(()),
        }
    }
}

/// One simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Parameters common to all strategies.
    pub shared: SharedParameters,
    /// Strategy and its own fields.
    pub payload: StrategyPayload,
}

impl SimulationRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(shared: SharedParameters, payload: StrategyPayload) -> Self {
        Self { shared, payload }
    }

    /// Identifier of the requested strategy.
    #[must_use]
    pub fn strategy(&self) -> StrategyId {
        self.payload.strategy()
    }

    /// Validates shared and strategy-specific fields.
    ///
    /// # Errors
    /// Returns the first `InvalidParameter` found.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.shared.validate()?;
        self.payload.validate()
    }

    /// Query-string pairs understood by the simulator's `/simulate` endpoint.
    ///
    /// When both realistic conditions and a custom strategy set `max_bet`,
    /// the tighter of the two caps is sent.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("strategy", self.strategy().as_str().to_string()),
            ("bet", self.shared.bet.to_string()),
            ("rounds", self.shared.rounds.to_string()),
            ("bankroll", self.shared.bankroll.to_string()),
        ];

        match &self.payload {
            StrategyPayload::FixedPercent { percent_bet } => {
                pairs.push(("percent_bet", percent_bet.to_string()));
            }
            StrategyPayload::TargetProfit { target_profit } => {
                pairs.push(("target_profit", target_profit.to_string()));
            }
            _ => {}
        }

        let custom = match &self.payload {
            StrategyPayload::Custom(custom) => Some(custom),
            _ => None,
        };

        if let Some(realistic) = &self.shared.realistic {
            pairs.push(("realistic_conditions", "true".to_string()));
            pairs.push(("min_bet", realistic.min_bet.to_string()));
            let max_bet = custom.map_or(realistic.max_bet, |c| c.max_bet.min(realistic.max_bet));
            pairs.push(("max_bet", max_bet.to_string()));
            pairs.push(("network_delay", realistic.network_delay.to_string()));
            pairs.push(("error_simulation", realistic.error_simulation.to_string()));
        } else if let Some(custom) = custom {
            pairs.push(("max_bet", custom.max_bet.to_string()));
        }

        if let Some(custom) = custom {
            pairs.push(("cashout_target", custom.cashout_target.to_string()));
            pairs.push(("bet_sequence", custom.bet_sequence_param()));
            pairs.push(("stop_loss", custom.stop_loss.to_string()));
            pairs.push(("take_profit", custom.take_profit.to_string()));
            pairs.push(("progression_type", custom.progression_type.to_string()));
        }

        pairs
    }
}
