use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::aggregate::{aggregate, YearlyData};
use super::engine::{build_schedule, AmortizationEntry};
use crate::loan::LoanDetails;
use crate::time_value::{annual_percent, annuity_payment, irr, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Percent};
use crate::validation::validate;
use crate::MortgageResult;

/// Effect of the overpayment plans, measured against the same loan without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpaymentSavings {
    pub baseline_total_interest: Money,
    pub interest_saved: Money,
    pub baseline_term_months: u32,
    pub actual_term_months: u32,
    pub months_saved: u32,
    /// Last full standard payment of the baseline ledger.
    pub baseline_monthly_payment: Money,
    /// Last full standard payment of the actual ledger.
    pub final_monthly_payment: Money,
    pub monthly_payment_reduction: Money,
}

/// Everything the engine derives for one loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Standard payment of the initial rate period over the full term.
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// Principal repaid, overpayments included.
    pub total_principal: Money,
    pub total_overpayment: Money,
    pub total_fees: Money,
    /// Principal + interest + fees.
    pub total_payment: Money,
    pub number_of_payments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    /// Annual percent implied by net proceeds against every payment and fee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_in_rate: Option<Percent>,
    pub amortization_schedule: Vec<AmortizationEntry>,
    pub yearly_data: Vec<YearlyData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<OverpaymentSavings>,
    pub currency: Currency,
}

impl CalculationResult {
    /// Total cost of the loan used for rankings: every payment plus fees.
    pub fn total_cost(&self) -> Money {
        self.total_payment
    }
}

/// Validate, amortize and aggregate one loan.
pub fn calculate(loan: &LoanDetails) -> MortgageResult<CalculationResult> {
    validate(loan).into_result()?;

    let entries = build_schedule(loan)?;
    let savings = if loan.has_overpayments() {
        let baseline = build_schedule(&loan.without_overpayments())?;
        Some(savings_against(&baseline, &entries))
    } else {
        None
    };

    let initial_rate = loan.initial_rate().unwrap_or(Decimal::ZERO);
    let monthly_payment = annuity_payment(
        loan.principal,
        monthly_rate(initial_rate),
        loan.total_periods(),
    )?;

    let totals = aggregate(&entries);
    let fees = loan.fees();
    let total_fees = fees.total_for(entries.len());
    let all_in_rate = all_in_rate(loan, &entries, initial_rate);

    Ok(CalculationResult {
        monthly_payment,
        total_interest: totals.total_interest,
        total_principal: totals.total_principal,
        total_overpayment: totals.total_overpayment,
        total_fees,
        total_payment: totals.total_payment + total_fees,
        number_of_payments: entries.len() as u32,
        payoff_date: entries.last().map(|e| e.date),
        all_in_rate,
        yearly_data: totals.yearly_data,
        amortization_schedule: entries,
        savings,
        currency: loan.currency.clone(),
    })
}

/// `calculate` wrapped in the standard computation envelope.
pub fn analyze_loan(loan: &LoanDetails) -> MortgageResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();
    let result = calculate(loan)?;
    let warnings = ledger_warnings(loan, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity amortization with rate resets and overpayments",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "loan_term_years": loan.loan_term_years,
            "rate_periods": loan.interest_rate_periods.len(),
            "overpayment_plans": loan.overpayment_plans.len(),
            "payment_timing": "end of period, monthly",
        }),
        warnings,
        elapsed,
        result,
    ))
}

fn ledger_warnings(loan: &LoanDetails, result: &CalculationResult) -> Vec<String> {
    let mut warnings = Vec::new();
    let last_period = result.number_of_payments;

    for (i, plan) in loan.overpayment_plans.iter().enumerate() {
        if plan.start_month > last_period {
            warnings.push(format!(
                "overpayment_plans[{i}] starts at period {} after payoff at period {last_period}; never applied",
                plan.start_month
            ));
        }
    }
    for (i, period) in loan.interest_rate_periods.iter().enumerate() {
        if period.start_month > last_period {
            warnings.push(format!(
                "interest_rate_periods[{i}] starts at period {} after payoff at period {last_period}; ignored",
                period.start_month
            ));
        }
    }
    if let Some(savings) = &result.savings {
        if savings.interest_saved < Decimal::ZERO {
            warnings.push("Overpayments increased total interest against the baseline".into());
        }
    }
    warnings
}

fn savings_against(baseline: &[AmortizationEntry], actual: &[AmortizationEntry]) -> OverpaymentSavings {
    let baseline_total_interest = aggregate(baseline).total_interest;
    let actual_interest = aggregate(actual).total_interest;
    let baseline_term = baseline.len() as u32;
    let actual_term = actual.len() as u32;
    let baseline_monthly_payment = last_standard_payment(baseline);
    let final_monthly_payment = last_standard_payment(actual);

    OverpaymentSavings {
        baseline_total_interest,
        interest_saved: baseline_total_interest - actual_interest,
        baseline_term_months: baseline_term,
        actual_term_months: actual_term,
        months_saved: baseline_term.saturating_sub(actual_term),
        baseline_monthly_payment,
        final_monthly_payment,
        monthly_payment_reduction: baseline_monthly_payment - final_monthly_payment,
    }
}

/// Payment of the period before the terminal one, which may be a short payoff.
fn last_standard_payment(entries: &[AmortizationEntry]) -> Money {
    let idx = entries.len().saturating_sub(2);
    entries
        .get(idx)
        .map(|e| e.payment_amount)
        .unwrap_or(Decimal::ZERO)
}

fn all_in_rate(loan: &LoanDetails, entries: &[AmortizationEntry], initial_rate: Percent) -> Option<Percent> {
    if entries.is_empty() {
        return None;
    }
    let fees = loan.fees();
    let mut flows = Vec::with_capacity(entries.len() + 1);
    flows.push(fees.one_time - loan.principal);
    flows.extend(
        entries
            .iter()
            .map(|e| e.payment_amount + e.overpayment_applied + fees.monthly),
    );

    match irr(&flows, monthly_rate(initial_rate)) {
        Ok(rate) => Some(annual_percent(rate)),
        Err(e) => {
            debug!("all-in rate unavailable: {e}");
            None
        }
    }
}
