//! Side-by-side evaluation of several independent loan offers.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{calculate, CalculationResult};
use crate::batch::map_items;
use crate::error::MortgageError;
use crate::loan::LoanDetails;
use crate::types::{ItemOutcome, Money};
use crate::MortgageResult;

/// A loan offer with a caller-chosen label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledLoan {
    pub label: String,
    pub loan: LoanDetails,
}

impl LabeledLoan {
    pub fn new(label: impl Into<String>, loan: LoanDetails) -> Self {
        Self {
            label: label.into(),
            loan,
        }
    }
}

/// Bounds on the size of a comparison set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub min_loans: usize,
    pub max_loans: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            min_loans: 2,
            max_loans: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedLoan {
    pub label: String,
    pub loan: LoanDetails,
    pub outcome: ItemOutcome<CalculationResult>,
}

/// Winner of one ranking criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPick {
    /// Position in the input set.
    pub index: usize,
    pub label: String,
    pub value: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub best_by_monthly_payment: Option<ComparisonPick>,
    pub best_by_total_interest: Option<ComparisonPick>,
    pub best_by_total_cost: Option<ComparisonPick>,
    /// Worst total cost minus best total cost over completed loans.
    pub total_savings: Money,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub loans: Vec<ComparedLoan>,
    pub summary: ComparisonSummary,
}

/// Compare 2 to 5 loans.
pub fn compare(loans: &[LabeledLoan]) -> MortgageResult<ComparisonResult> {
    compare_with(loans, &ComparisonConfig::default())
}

/// Compare loans under custom size bounds.
///
/// A set outside the bounds is rejected as a validation failure. Each loan
/// is calculated independently; an invalid or failing loan becomes a failed
/// item and is left out of the rankings.
pub fn compare_with(
    loans: &[LabeledLoan],
    config: &ComparisonConfig,
) -> MortgageResult<ComparisonResult> {
    if loans.len() > config.max_loans {
        return Err(MortgageError::LimitExceeded {
            what: "loans in a comparison".into(),
            limit: config.max_loans,
            actual: loans.len(),
        });
    }
    if loans.len() < config.min_loans {
        return Err(MortgageError::InvalidInput {
            field: "loans".into(),
            reason: format!(
                "At least {} loans are required for a comparison (got {})",
                config.min_loans,
                loans.len()
            ),
        });
    }

    debug!("comparing {} loans", loans.len());
    let compared = map_items(loans, |item| {
        let outcome = ItemOutcome::from_result(calculate(&item.loan));
        if let Some(reason) = outcome.failure_reason() {
            log::warn!("loan '{}' failed: {reason}", item.label);
        }
        ComparedLoan {
            label: item.label.clone(),
            loan: item.loan.clone(),
            outcome,
        }
    });

    let summary = summarize(&compared);
    Ok(ComparisonResult {
        loans: compared,
        summary,
    })
}

fn summarize(loans: &[ComparedLoan]) -> ComparisonSummary {
    let completed: Vec<(usize, &ComparedLoan, &CalculationResult)> = loans
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.outcome.completed().map(|r| (i, l, r)))
        .collect();

    let best_by_monthly_payment = pick_min(&completed, |r| r.monthly_payment);
    let best_by_total_interest = pick_min(&completed, |r| r.total_interest);
    let best_by_total_cost = pick_min(&completed, |r| r.total_cost());

    let worst_cost = completed
        .iter()
        .map(|(_, _, r)| r.total_cost())
        .max()
        .unwrap_or(Decimal::ZERO);
    let total_savings = best_by_total_cost
        .as_ref()
        .map(|best| worst_cost - best.value)
        .unwrap_or(Decimal::ZERO);

    ComparisonSummary {
        best_by_monthly_payment,
        best_by_total_interest,
        best_by_total_cost,
        total_savings,
        completed: completed.len(),
        failed: loans.len() - completed.len(),
    }
}

/// Numeric minimum, first occurrence on ties.
fn pick_min<F>(
    completed: &[(usize, &ComparedLoan, &CalculationResult)],
    metric: F,
) -> Option<ComparisonPick>
where
    F: Fn(&CalculationResult) -> Money,
{
    let mut best: Option<ComparisonPick> = None;
    for (index, loan, result) in completed {
        let value = metric(result);
        if best.as_ref().map_or(true, |b| value < b.value) {
            best = Some(ComparisonPick {
                index: *index,
                label: loan.label.clone(),
                value,
            });
        }
    }
    best
}
