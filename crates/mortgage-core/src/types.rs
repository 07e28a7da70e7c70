use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.00375 = 0.375% per month).
pub type Rate = Decimal;

/// Annual rates as entered by borrowers, in percent (4.5 = 4.5%).
pub type Percent = Decimal;

/// Currency label. No conversion is ever performed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    PLN,
    Other(String),
}

/// Per-item result inside a batch (scenario set, loan comparison).
///
/// A failing item never aborts its siblings; the caller decides whether a
/// batch with failures counts as failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome<T> {
    Completed { result: T },
    Failed { reason: String, validation: bool },
}

impl<T> ItemOutcome<T> {
    pub fn from_result(result: Result<T, MortgageError>) -> Self {
        match result {
            Ok(result) => ItemOutcome::Completed { result },
            Err(e) => ItemOutcome::Failed {
                validation: e.is_validation_failure(),
                reason: e.to_string(),
            },
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            ItemOutcome::Completed { result } => Some(result),
            ItemOutcome::Failed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ItemOutcome::Completed { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ItemOutcome::Completed { .. } => None,
            ItemOutcome::Failed { reason, .. } => Some(reason),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
