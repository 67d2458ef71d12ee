use thiserror::Error;

/// Errors raised by the simulation engine.
///
/// Only parameter and configuration problems are errors. A CET solve that
/// runs out of iterations still returns its best estimate, flagged through
/// [`crate::EffectiveRate::converged`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinancingError {
    #[error("Invalid parameter: {field} ({reason})")]
    InvalidParameter { field: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FinancingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FinancingError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type FinancingResult<T> = Result<T, FinancingError>;
