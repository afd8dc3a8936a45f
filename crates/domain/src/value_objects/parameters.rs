//! Request parameters shared by every strategy, plus the optional
//! realistic-conditions and custom-strategy blocks.

use crate::enums::ProgressionType;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default flat stake.
pub const DEFAULT_BET: f64 = 1.0;
/// Default number of rounds requested.
pub const DEFAULT_ROUNDS: u32 = 1000;
/// Default starting bankroll.
pub const DEFAULT_BANKROLL: f64 = 100.0;
/// Default profit goal for `target_profit`.
pub const DEFAULT_TARGET_PROFIT: f64 = 50.0;
/// Default stake percentage for `fixed_percent`.
pub const DEFAULT_PERCENT_BET: f64 = 5.0;
/// Lowest multiplier the game ever pays out.
pub const MIN_CASHOUT_TARGET: f64 = 1.01;

fn require_positive(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::invalid(
            field,
            format!("must be a positive number, got {value}"),
        ));
    }
    Ok(())
}

fn require_finite(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::invalid(field, format!("must be finite, got {value}")));
    }
    Ok(())
}

/// Parameters every simulation request carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedParameters {
    /// Base stake per round.
    pub bet: f64,
    /// Rounds requested; the simulator may stop earlier.
    pub rounds: u32,
    /// Starting bankroll.
    pub bankroll: f64,
    /// Bet limits and injected faults, when enabled.
    #[serde(default)]
    pub realistic: Option<RealisticConditions>,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self {
            bet: DEFAULT_BET,
            rounds: DEFAULT_ROUNDS,
            bankroll: DEFAULT_BANKROLL,
            realistic: None,
        }
    }
}

impl SharedParameters {
    /// Creates shared parameters without realistic conditions.
    #[must_use]
    pub fn new(bet: f64, rounds: u32, bankroll: f64) -> Self {
        Self {
            bet,
            rounds,
            bankroll,
            realistic: None,
        }
    }

    /// Enables realistic conditions.
    #[must_use]
    pub fn with_realistic(mut self, realistic: RealisticConditions) -> Self {
        self.realistic = Some(realistic);
        self
    }

    /// Checks ranges of every field.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_positive("bet", self.bet)?;
        if self.rounds == 0 {
            return Err(DomainError::invalid("rounds", "must be at least 1"));
        }
        require_positive("bankroll", self.bankroll)?;
        if let Some(realistic) = &self.realistic {
            realistic.validate()?;
        }
        Ok(())
    }
}

/// Optional simulation constraints reported back as auxiliary counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealisticConditions {
    /// Smallest stake the table accepts.
    pub min_bet: f64,
    /// Largest stake the table accepts.
    pub max_bet: f64,
    /// Simulate network latency between rounds.
    pub network_delay: bool,
    /// Inject connection errors.
    pub error_simulation: bool,
}

impl Default for RealisticConditions {
    fn default() -> Self {
        Self {
            min_bet: 0.1,
            max_bet: 100.0,
            network_delay: false,
            error_simulation: false,
        }
    }
}

impl RealisticConditions {
    /// Checks the bet limits.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for non-positive limits or `min_bet > max_bet`.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_positive("min_bet", self.min_bet)?;
        require_positive("max_bet", self.max_bet)?;
        if self.min_bet > self.max_bet {
            return Err(DomainError::invalid(
                "min_bet",
                format!("{} exceeds max_bet {}", self.min_bet, self.max_bet),
            ));
        }
        Ok(())
    }
}

/// Fields of a user-defined strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStrategy {
    /// Multiplier at which every bet is cashed out.
    pub cashout_target: f64,
    /// Stakes stepped through by the progression.
    pub bet_sequence: Vec<f64>,
    /// Cap on any single stake.
    pub max_bet: f64,
    /// Stop when the balance falls to this value.
    pub stop_loss: f64,
    /// Stop when the balance climbs to this value.
    pub take_profit: f64,
    /// Which outcome advances the sequence.
    pub progression_type: ProgressionType,
}

impl Default for CustomStrategy {
    fn default() -> Self {
        Self {
            cashout_target: 2.0,
            bet_sequence: vec![1.0, 2.0, 4.0],
            max_bet: 20.0,
            stop_loss: 50.0,
            take_profit: 200.0,
            progression_type: ProgressionType::Loss,
        }
    }
}

impl CustomStrategy {
    /// Parses a comma-separated list of stakes such as `"1,2,4"`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` when an entry is not a positive number or
    /// the list is empty.
    pub fn parse_bet_sequence(raw: &str) -> Result<Vec<f64>, DomainError> {
        let stakes = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>().map_err(|_| {
                    DomainError::invalid("bet_sequence", format!("`{part}` is not a number"))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        if stakes.is_empty() {
            return Err(DomainError::invalid("bet_sequence", "at least one stake is required"));
        }
        for stake in &stakes {
            require_positive("bet_sequence", *stake)?;
        }
        Ok(stakes)
    }

    /// Wire form of the bet sequence.
    #[must_use]
    pub fn bet_sequence_param(&self) -> String {
        self.bet_sequence
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Checks ranges of every field.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.cashout_target.is_finite() || self.cashout_target < MIN_CASHOUT_TARGET {
            return Err(DomainError::invalid(
                "cashout_target",
                format!("must be at least {MIN_CASHOUT_TARGET}, got {}", self.cashout_target),
            ));
        }
        if self.bet_sequence.is_empty() {
            return Err(DomainError::invalid("bet_sequence", "at least one stake is required"));
        }
        for stake in &self.bet_sequence {
            require_positive("bet_sequence", *stake)?;
        }
        require_positive("max_bet", self.max_bet)?;
        require_finite("stop_loss", self.stop_loss)?;
        require_finite("take_profit", self.take_profit)?;
        if self.stop_loss >= self.take_profit {
            return Err(DomainError::invalid(
                "stop_loss",
                format!("{} must be below take_profit {}", self.stop_loss, self.take_profit),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_defaults_are_valid() {
        let params = SharedParameters::default();
        assert_eq!(params.rounds, DEFAULT_ROUNDS);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_shared_rejects_bad_values() {
        assert!(SharedParameters::new(0.0, 10, 100.0).validate().is_err());
        assert!(SharedParameters::new(1.0, 0, 100.0).validate().is_err());
        assert!(SharedParameters::new(1.0, 10, f64::NAN).validate().is_err());

        let inverted = RealisticConditions {
            min_bet: 10.0,
            max_bet: 5.0,
            ..Default::default()
        };
        let err = SharedParameters::default()
            .with_realistic(inverted)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("min_bet"));
    }

    #[test]
    fn test_parse_bet_sequence() {
        assert_eq!(
            CustomStrategy::parse_bet_sequence("1, 2,4.5").unwrap(),
            vec![1.0, 2.0, 4.5]
        );
        assert!(CustomStrategy::parse_bet_sequence("").is_err());
        assert!(CustomStrategy::parse_bet_sequence("1,x").is_err());
        assert!(CustomStrategy::parse_bet_sequence("1,-2").is_err());
    }

    #[test]
    fn test_bet_sequence_param() {
        let custom = CustomStrategy {
            bet_sequence: vec![1.0, 2.5, 4.0],
            ..Default::default()
        };
        assert_eq!(custom.bet_sequence_param(), "1,2.5,4");
    }

    #[test]
    fn test_custom_validation() {
        assert!(CustomStrategy::default().validate().is_ok());

        let low_cashout = CustomStrategy {
            cashout_target: 1.0,
            ..Default::default()
        };
        assert!(low_cashout.validate().is_err());

        let inverted = CustomStrategy {
            stop_loss: 300.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
