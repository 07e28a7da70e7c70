use thiserror::Error;

use crate::validation::Violation;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error("Limit exceeded: {what} allows at most {limit}, got {actual}")]
    LimitExceeded {
        what: String,
        limit: usize,
        actual: usize,
    },

    #[error("Computation error in {context}: {reason}")]
    Computation { context: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MortgageError {
    /// True for errors the caller recovers from by correcting input.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            MortgageError::InvalidInput { .. }
                | MortgageError::Validation(_)
                | MortgageError::LimitExceeded { .. }
        )
    }

    /// Violations carried by a validation failure, empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            MortgageError::Validation(v) => v,
            _ => &[],
        }
    }

    pub(crate) fn computation(context: &str, reason: impl Into<String>) -> Self {
        MortgageError::Computation {
            context: context.to_string(),
            reason: reason.into(),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}
