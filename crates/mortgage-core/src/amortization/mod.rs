//! Single-loan pipeline: validation, ledger, yearly aggregation.

pub mod aggregate;
pub mod calculate;
pub mod engine;

pub use aggregate::{aggregate, Aggregation, YearlyData};
pub use calculate::{analyze_loan, calculate, CalculationResult, OverpaymentSavings};
pub use engine::{amortize, AmortizationEntry, BALANCE_EPSILON};
