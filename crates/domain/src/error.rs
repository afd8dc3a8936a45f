//! Domain error types.

use thiserror::Error;

/// Errors raised while building or validating domain values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// A balance sequence must contain at least one value.
    #[error("balance sequence is empty")]
    EmptySequence,

    /// A balance value was NaN or infinite.
    #[error("balance at index {index} is not a finite number ({value})")]
    NonFiniteBalance {
        /// Offending position.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Strategy identifier not in the supported set.
    #[error("unknown strategy `{0}`")]
    UnknownStrategy(String),

    /// A request parameter is out of range or malformed.
    #[error("invalid `{field}`: {reason}")]
    InvalidParameter {
        /// Parameter name as sent on the wire.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl DomainError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
