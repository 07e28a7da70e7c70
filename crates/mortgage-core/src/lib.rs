pub mod amortization;
pub mod batch;
pub mod error;
pub mod loan;
pub mod time_value;
pub mod types;
pub mod validation;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage calculations
pub type MortgageResult<T> = Result<T, MortgageError>;
