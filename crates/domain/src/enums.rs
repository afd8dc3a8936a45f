use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staking strategies understood by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Cash out at 1.5x every round.
    Early,
    /// Cash out at 2.5x every round.
    Mid,
    /// Cash out at 10x every round.
    High,
    /// Two simultaneous bets, one cashed early and one left to ride.
    Dual,
    /// Double the stake after every loss.
    Martingale,
    /// Double the stake after every win.
    Paroli,
    /// Stake a fixed percentage of the current bankroll.
    FixedPercent,
    /// Flat stake until a profit goal is reached.
    TargetProfit,
    /// User-defined bet sequence and thresholds.
    Custom,
}

impl StrategyId {
    /// Every strategy, in the order the selector lists them.
    pub const ALL: [StrategyId; 9] = [
        StrategyId::Early,
        StrategyId::Mid,
        StrategyId::High,
        StrategyId::Dual,
        StrategyId::Martingale,
        StrategyId::Paroli,
        StrategyId::FixedPercent,
        StrategyId::TargetProfit,
        StrategyId::Custom,
    ];

    /// Wire identifier used in requests and persisted records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Early => "early",
            StrategyId::Mid => "mid",
            StrategyId::High => "high",
            StrategyId::Dual => "dual",
            StrategyId::Martingale => "martingale",
            StrategyId::Paroli => "paroli",
            StrategyId::FixedPercent => "fixed_percent",
            StrategyId::TargetProfit => "target_profit",
            StrategyId::Custom => "custom",
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            StrategyId::Early => "Early Cashout",
            StrategyId::Mid => "Mid-Risk",
            StrategyId::High => "High-Risk",
            StrategyId::Dual => "Dual Bet",
            StrategyId::Martingale => "Martingale",
            StrategyId::Paroli => "Paroli",
            StrategyId::FixedPercent => "Fixed % of Bankroll",
            StrategyId::TargetProfit => "Target Profit Goal",
            StrategyId::Custom => "Custom",
        }
    }

    /// Whether the simulator starts this strategy from the supplied bankroll.
    ///
    /// The cash-out strategies (`early`, `mid`, `high`, `dual`) report
    /// cumulative profit starting from zero instead.
    #[must_use]
    pub fn uses_bankroll(&self) -> bool {
        matches!(
            self,
            StrategyId::Martingale
                | StrategyId::Paroli
                | StrategyId::FixedPercent
                | StrategyId::TargetProfit
                | StrategyId::Custom
        )
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| DomainError::UnknownStrategy(s.to_string()))
    }
}

/// Which outcome advances a custom bet sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionType {
    /// Step forward after a loss.
    #[default]
    Loss,
    /// Step forward after a win.
    Win,
}

impl ProgressionType {
    /// Wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressionType::Loss => "loss",
            ProgressionType::Win => "win",
        }
    }
}

impl fmt::Display for ProgressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "loss" => Ok(ProgressionType::Loss),
            "win" => Ok(ProgressionType::Win),
            other => Err(DomainError::InvalidParameter {
                field: "progression_type",
                reason: format!("expected `loss` or `win`, got `{other}`"),
            }),
        }
    }
}
