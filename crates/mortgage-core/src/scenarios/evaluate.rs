use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::definition::{ScenarioConfig, ScenarioDefinition, ScenarioKind};
use crate::amortization::{calculate, CalculationResult};
use crate::error::MortgageError;
use crate::loan::LoanDetails;
use crate::types::{ItemOutcome, Money, Percent};
use crate::MortgageResult;

/// Classification of a scenario's total-interest delta against the base.
///
/// Ordered from best to worst so the highest tier of a set is its `max`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Favorable,
    #[default]
    Neutral,
    Adverse,
    Severe,
}

/// Deltas of a scenario against the base calculation (scenario minus base).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub monthly_payment_delta: Money,
    pub interest_delta: Money,
    /// `None` when the base pays no interest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_delta_pct: Option<Percent>,
    pub total_cost_delta: Money,
    pub term_delta_months: i64,
    /// Payment ratio scaled by the income shock; stress tests only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_burden_index: Option<Decimal>,
    pub risk: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEvaluation {
    pub calculation: CalculationResult,
    pub metrics: ScenarioMetrics,
}

/// One scenario: the mutated loan and how it fared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub kind: ScenarioKind,
    pub loan: LoanDetails,
    pub outcome: ItemOutcome<ScenarioEvaluation>,
}

impl ScenarioResult {
    pub fn evaluation(&self) -> Option<&ScenarioEvaluation> {
        self.outcome.completed()
    }
}

/// Place an interest delta percent into a risk tier.
pub fn classify(interest_delta_pct: Percent, config: &ScenarioConfig) -> RiskTier {
    if interest_delta_pct.abs() <= config.neutral_band_pct {
        RiskTier::Neutral
    } else if interest_delta_pct < Decimal::ZERO {
        RiskTier::Favorable
    } else if interest_delta_pct > config.severe_threshold_pct {
        RiskTier::Severe
    } else {
        RiskTier::Adverse
    }
}

/// Run one definition against an already calculated base.
///
/// Failures stay inside the returned item.
pub(crate) fn evaluate(
    base_loan: &LoanDetails,
    base: &CalculationResult,
    definition: &ScenarioDefinition,
    config: &ScenarioConfig,
) -> ScenarioResult {
    let loan = definition.kind.apply(base_loan);
    let outcome = ItemOutcome::from_result(run(&loan, base, &definition.kind, config));
    if let Some(reason) = outcome.failure_reason() {
        log::warn!("scenario '{}' failed: {reason}", definition.name);
    }

    ScenarioResult {
        name: definition.name.clone(),
        kind: definition.kind.clone(),
        loan,
        outcome,
    }
}

fn run(
    loan: &LoanDetails,
    base: &CalculationResult,
    kind: &ScenarioKind,
    config: &ScenarioConfig,
) -> MortgageResult<ScenarioEvaluation> {
    let income_shock = match kind {
        ScenarioKind::StressTest { profile } => {
            if profile.income_shock < Decimal::ZERO || profile.income_shock >= Decimal::ONE {
                return Err(MortgageError::InvalidInput {
                    field: "profile.income_shock".into(),
                    reason: format!("must be in [0, 1) (got {})", profile.income_shock),
                });
            }
            Some(profile.income_shock)
        }
        _ => None,
    };

    let calculation = calculate(loan)?;
    let metrics = metrics_against(base, &calculation, income_shock, config);
    Ok(ScenarioEvaluation {
        calculation,
        metrics,
    })
}

fn metrics_against(
    base: &CalculationResult,
    scenario: &CalculationResult,
    income_shock: Option<Decimal>,
    config: &ScenarioConfig,
) -> ScenarioMetrics {
    let interest_delta = scenario.total_interest - base.total_interest;
    let interest_delta_pct = if base.total_interest.is_zero() {
        None
    } else {
        Some(interest_delta / base.total_interest * dec!(100))
    };

    let risk = match interest_delta_pct {
        Some(pct) => classify(pct, config),
        // Zero-interest base: any added interest is unbounded in percent.
        None if interest_delta > Decimal::ZERO => RiskTier::Severe,
        None => RiskTier::Neutral,
    };

    let payment_burden_index = income_shock.and_then(|shock| {
        if base.monthly_payment.is_zero() {
            return None;
        }
        let ratio = scenario.monthly_payment / base.monthly_payment;
        Some(ratio / (Decimal::ONE - shock))
    });

    ScenarioMetrics {
        monthly_payment_delta: scenario.monthly_payment - base.monthly_payment,
        interest_delta,
        interest_delta_pct,
        total_cost_delta: scenario.total_payment - base.total_payment,
        term_delta_months: i64::from(scenario.number_of_payments)
            - i64::from(base.number_of_payments),
        payment_burden_index,
        risk,
    }
}
