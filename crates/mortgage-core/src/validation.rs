//! Structural validation of a loan before any calculation runs.
//!
//! Unlike the single-field checks elsewhere, `validate` walks the whole
//! `LoanDetails` and reports every violation it finds so a form can flag all
//! offending fields at once.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::loan::LoanDetails;
use crate::types::{Money, Percent};
use crate::MortgageResult;

/// Longest term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 100;

/// A single structural problem with a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    NonPositivePrincipal { principal: Money },
    MissingRatePeriods,
    FirstRatePeriodNotAtStart { start_month: u32 },
    NegativeInterestRate { index: usize, interest_rate: Percent },
    DuplicateRatePeriodStart { start_month: u32 },
    NonPositiveTerm,
    TermTooLong { loan_term_years: u32 },
    NonPositiveOverpayment { index: usize, amount: Money },
    OverpaymentStartsBeforeFirstPeriod { index: usize, start_month: u32 },
    OverpaymentEndNotAfterStart { index: usize, start_month: u32, end_month: u32 },
    NegativeFee { field: String, amount: Money },
}

impl Violation {
    /// Dotted path of the offending input field.
    pub fn field(&self) -> String {
        match self {
            Violation::NonPositivePrincipal { .. } => "principal".into(),
            Violation::MissingRatePeriods => "interest_rate_periods".into(),
            Violation::FirstRatePeriodNotAtStart { .. } => "interest_rate_periods[0].start_month".into(),
            Violation::NegativeInterestRate { index, .. } => {
                format!("interest_rate_periods[{index}].interest_rate")
            }
            Violation::DuplicateRatePeriodStart { .. } => "interest_rate_periods".into(),
            Violation::NonPositiveTerm | Violation::TermTooLong { .. } => "loan_term_years".into(),
            Violation::NonPositiveOverpayment { index, .. } => {
                format!("overpayment_plans[{index}].amount")
            }
            Violation::OverpaymentStartsBeforeFirstPeriod { index, .. } => {
                format!("overpayment_plans[{index}].start_month")
            }
            Violation::OverpaymentEndNotAfterStart { index, .. } => {
                format!("overpayment_plans[{index}].end_month")
            }
            Violation::NegativeFee { field, .. } => format!("additional_costs.{field}"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field();
        match self {
            Violation::NonPositivePrincipal { principal } => {
                write!(f, "{field}: principal must be positive (got {principal})")
            }
            Violation::MissingRatePeriods => {
                write!(f, "{field}: at least one interest rate period is required")
            }
            Violation::FirstRatePeriodNotAtStart { start_month } => write!(
                f,
                "{field}: first rate period must start at month 0 (got {start_month})"
            ),
            Violation::NegativeInterestRate { interest_rate, .. } => {
                write!(f, "{field}: interest rate must be >= 0 (got {interest_rate})")
            }
            Violation::DuplicateRatePeriodStart { start_month } => write!(
                f,
                "{field}: more than one rate period starts at month {start_month}"
            ),
            Violation::NonPositiveTerm => write!(f, "{field}: loan term must be at least 1 year"),
            Violation::TermTooLong { loan_term_years } => write!(
                f,
                "{field}: loan term of {loan_term_years} years exceeds {MAX_TERM_YEARS}"
            ),
            Violation::NonPositiveOverpayment { amount, .. } => {
                write!(f, "{field}: overpayment amount must be positive (got {amount})")
            }
            Violation::OverpaymentStartsBeforeFirstPeriod { start_month, .. } => write!(
                f,
                "{field}: overpayment must start at period 1 or later (got {start_month})"
            ),
            Violation::OverpaymentEndNotAfterStart {
                start_month,
                end_month,
                ..
            } => write!(
                f,
                "{field}: end month {end_month} must be after start month {start_month}"
            ),
            Violation::NegativeFee { amount, .. } => {
                write!(f, "{field}: fees cannot be negative (got {amount})")
            }
        }
    }
}

/// Every violation found in one loan. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> MortgageResult<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(MortgageError::Validation(self.violations))
        }
    }
}

/// Check a loan for structural problems without calculating anything.
pub fn validate(loan: &LoanDetails) -> ValidationOutcome {
    let mut violations = Vec::new();

    if loan.principal <= Decimal::ZERO {
        violations.push(Violation::NonPositivePrincipal {
            principal: loan.principal,
        });
    }

    check_rate_periods(loan, &mut violations);

    if loan.loan_term_years == 0 {
        violations.push(Violation::NonPositiveTerm);
    } else if loan.loan_term_years > MAX_TERM_YEARS {
        violations.push(Violation::TermTooLong {
            loan_term_years: loan.loan_term_years,
        });
    }

    for (index, plan) in loan.overpayment_plans.iter().enumerate() {
        if plan.amount <= Decimal::ZERO {
            violations.push(Violation::NonPositiveOverpayment {
                index,
                amount: plan.amount,
            });
        }
        if plan.start_month < 1 {
            violations.push(Violation::OverpaymentStartsBeforeFirstPeriod {
                index,
                start_month: plan.start_month,
            });
        }
        if let Some(end_month) = plan.end_month {
            if end_month <= plan.start_month {
                violations.push(Violation::OverpaymentEndNotAfterStart {
                    index,
                    start_month: plan.start_month,
                    end_month,
                });
            }
        }
    }

    if let Some(costs) = &loan.additional_costs {
        if costs.one_time < Decimal::ZERO {
            violations.push(Violation::NegativeFee {
                field: "one_time".into(),
                amount: costs.one_time,
            });
        }
        if costs.monthly < Decimal::ZERO {
            violations.push(Violation::NegativeFee {
                field: "monthly".into(),
                amount: costs.monthly,
            });
        }
    }

    ValidationOutcome { violations }
}

fn check_rate_periods(loan: &LoanDetails, violations: &mut Vec<Violation>) {
    let periods = &loan.interest_rate_periods;
    if periods.is_empty() {
        violations.push(Violation::MissingRatePeriods);
        return;
    }

    if let Some(earliest) = periods.iter().map(|p| p.start_month).min() {
        if earliest != 0 {
            violations.push(Violation::FirstRatePeriodNotAtStart {
                start_month: earliest,
            });
        }
    }

    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for (index, period) in periods.iter().enumerate() {
        if period.interest_rate < Decimal::ZERO {
            violations.push(Violation::NegativeInterestRate {
                index,
                interest_rate: period.interest_rate,
            });
        }
        if !seen.insert(period.start_month) && reported.insert(period.start_month) {
            violations.push(Violation::DuplicateRatePeriodStart {
                start_month: period.start_month,
            });
        }
    }
}
