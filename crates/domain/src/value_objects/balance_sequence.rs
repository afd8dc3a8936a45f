use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Bankroll values observed after each completed round.
///
/// Always holds at least one finite value. Serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BalanceSequence(Vec<f64>);

impl BalanceSequence {
    /// Validates and wraps a list of balances.
    ///
    /// # Errors
    /// Returns `EmptySequence` for an empty list and `NonFiniteBalance` for
    /// NaN or infinite entries.
    pub fn new(values: Vec<f64>) -> Result<Self, DomainError> {
        if values.is_empty() {
            return Err(DomainError::EmptySequence);
        }
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DomainError::NonFiniteBalance {
                index,
                value: *value,
            });
        }
        Ok(Self(values))
    }

    /// First observed balance.
    #[must_use]
    pub fn first(&self) -> f64 {
        self.0[0]
    }

    /// Last observed balance.
    #[must_use]
    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Borrow the raw values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume into the raw values.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for BalanceSequence {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for BalanceSequence {
    type Error = DomainError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<BalanceSequence> for Vec<f64> {
    fn from(sequence: BalanceSequence) -> Self {
        sequence.0
    }
}
