use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::loan::{InterestRatePeriod, LoanDetails, OverpaymentPlan};
use crate::types::{Money, Percent, Rate};

// ---------------------------------------------------------------------------
// Stress profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressSeverity {
    Mild,
    Moderate,
    Severe,
}

impl StressSeverity {
    pub const ALL: [StressSeverity; 3] = [
        StressSeverity::Mild,
        StressSeverity::Moderate,
        StressSeverity::Severe,
    ];

    /// Rate and income shock tied to each severity.
    pub fn profile(self) -> StressProfile {
        let (rate_shock_pct, income_shock) = match self {
            StressSeverity::Mild => (dec!(1.0), dec!(0)),
            StressSeverity::Moderate => (dec!(2.0), dec!(0.10)),
            StressSeverity::Severe => (dec!(3.5), dec!(0.20)),
        };
        StressProfile {
            severity: self,
            rate_shock_pct,
            income_shock,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressSeverity::Mild => "mild",
            StressSeverity::Moderate => "moderate",
            StressSeverity::Severe => "severe",
        }
    }
}

/// Adverse conditions applied in a stress test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressProfile {
    pub severity: StressSeverity,
    /// Percentage points added to every rate period.
    pub rate_shock_pct: Percent,
    /// Fractional drop in borrower income (0.10 = 10%), in `[0, 1)`.
    pub income_shock: Rate,
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Parameter bag for a custom what-if scenario. Absent fields leave the base untouched.
///
/// Applied in a fixed order: rate periods override, rate override, rate
/// delta, principal override, principal delta, term override, clearing
/// overpayments, additional overpayments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_periods_override: Option<Vec<InterestRatePeriod>>,
    /// Replace every period's rate with this annual percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_override_pct: Option<Percent>,
    /// Percentage points added to every period's rate, floored at zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_delta_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_override: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_delta: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_term_years_override: Option<u32>,
    pub clear_overpayments: bool,
    pub additional_overpayments: Vec<OverpaymentPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioKind {
    RateChange { delta_pct: Percent },
    StressTest { profile: StressProfile },
    Custom { parameters: ScenarioParameters },
}

impl ScenarioKind {
    /// Derive the scenario loan from `base`. The base is only read.
    pub fn apply(&self, base: &LoanDetails) -> LoanDetails {
        match self {
            ScenarioKind::RateChange { delta_pct } => shift_rates(base, *delta_pct),
            ScenarioKind::StressTest { profile } => shift_rates(base, profile.rate_shock_pct),
            ScenarioKind::Custom { parameters } => apply_parameters(base, parameters),
        }
    }
}

/// A named mutation of a base loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(flatten)]
    pub kind: ScenarioKind,
}

impl ScenarioDefinition {
    pub fn rate_change(delta_pct: Percent) -> Self {
        let sign = if delta_pct >= Decimal::ZERO { "+" } else { "" };
        Self {
            name: format!("Rate {sign}{}pp", delta_pct.normalize()),
            kind: ScenarioKind::RateChange { delta_pct },
        }
    }

    pub fn stress_test(severity: StressSeverity) -> Self {
        Self {
            name: format!("Stress test: {}", severity.label()),
            kind: ScenarioKind::StressTest {
                profile: severity.profile(),
            },
        }
    }

    pub fn custom(name: impl Into<String>, parameters: ScenarioParameters) -> Self {
        Self {
            name: name.into(),
            kind: ScenarioKind::Custom { parameters },
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for scenario generation and risk classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Percentage-point deltas for rate-change scenarios.
    pub rate_deltas_pct: Vec<Percent>,
    pub stress_severities: Vec<StressSeverity>,
    /// Interest deltas within +/- this percent of base count as neutral.
    pub neutral_band_pct: Percent,
    /// Interest increases above this percent of base count as severe.
    pub severe_threshold_pct: Percent,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rate_deltas_pct: vec![
                dec!(-2),
                dec!(-1),
                dec!(-0.5),
                dec!(0.5),
                dec!(1),
                dec!(2),
            ],
            stress_severities: StressSeverity::ALL.to_vec(),
            neutral_band_pct: dec!(1),
            severe_threshold_pct: dec!(25),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

fn shift_rates(base: &LoanDetails, delta_pct: Percent) -> LoanDetails {
    let mut loan = base.clone();
    for period in &mut loan.interest_rate_periods {
        period.interest_rate = (period.interest_rate + delta_pct).max(Decimal::ZERO);
    }
    loan
}

fn apply_parameters(base: &LoanDetails, params: &ScenarioParameters) -> LoanDetails {
    let mut loan = base.clone();

    if let Some(periods) = &params.rate_periods_override {
        loan.interest_rate_periods = periods.clone();
    }
    if let Some(rate) = params.rate_override_pct {
        for period in &mut loan.interest_rate_periods {
            period.interest_rate = rate;
        }
    }
    if let Some(delta) = params.rate_delta_pct {
        loan = shift_rates(&loan, delta);
    }
    if let Some(principal) = params.principal_override {
        loan.principal = principal;
    }
    if let Some(delta) = params.principal_delta {
        loan.principal += delta;
    }
    if let Some(years) = params.loan_term_years_override {
        loan.loan_term_years = years;
    }
    if params.clear_overpayments {
        loan.overpayment_plans.clear();
    }
    loan.overpayment_plans
        .extend(params.additional_overpayments.iter().cloned());
    loan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::OverpaymentEffect;
    use chrono::NaiveDate;

    fn base() -> LoanDetails {
        LoanDetails::fixed_rate(
            dec!(300000),
            dec!(1.5),
            25,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_rate_change(60, dec!(3))
    }

    #[test]
    fn test_rate_change_floors_at_zero() {
        let loan = ScenarioKind::RateChange { delta_pct: dec!(-2) }.apply(&base());
        assert_eq!(loan.interest_rate_periods[0].interest_rate, Decimal::ZERO);
        assert_eq!(loan.interest_rate_periods[1].interest_rate, dec!(1));
    }

    #[test]
    fn test_apply_leaves_base_untouched() {
        let base = base();
        let snapshot = base.clone();
        let _ = ScenarioDefinition::stress_test(StressSeverity::Severe)
            .kind
            .apply(&base);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_custom_parameters_apply_in_order() {
        let params = ScenarioParameters {
            rate_override_pct: Some(dec!(5)),
            rate_delta_pct: Some(dec!(-1)),
            principal_override: Some(dec!(200000)),
            principal_delta: Some(dec!(-20000)),
            loan_term_years_override: Some(20),
            additional_overpayments: vec![OverpaymentPlan::one_time(
                dec!(1000),
                6,
                OverpaymentEffect::ReduceTerm,
            )],
            ..Default::default()
        };
        let loan = ScenarioKind::Custom { parameters: params }.apply(&base());
        assert!(loan
            .interest_rate_periods
            .iter()
            .all(|p| p.interest_rate == dec!(4)));
        assert_eq!(loan.principal, dec!(180000));
        assert_eq!(loan.loan_term_years, 20);
        assert_eq!(loan.overpayment_plans.len(), 1);
    }

    #[test]
    fn test_stress_profiles() {
        let moderate = StressSeverity::Moderate.profile();
        assert_eq!(moderate.rate_shock_pct, dec!(2.0));
        assert_eq!(moderate.income_shock, dec!(0.10));
        assert_eq!(StressSeverity::Mild.profile().income_shock, Decimal::ZERO);
    }

    #[test]
    fn test_rate_change_names() {
        assert_eq!(ScenarioDefinition::rate_change(dec!(0.5)).name, "Rate +0.5pp");
        assert_eq!(ScenarioDefinition::rate_change(dec!(-2)).name, "Rate -2pp");
    }

    #[test]
    fn test_definition_deserializes_flat() {
        let json = r#"{ "name": "Cheaper", "type": "custom", "parameters": { "rate_delta_pct": "-0.25" } }"#;
        let def: ScenarioDefinition = serde_json::from_str(json).unwrap();
        match def.kind {
            ScenarioKind::Custom { parameters } => {
                assert_eq!(parameters.rate_delta_pct, Some(dec!(-0.25)));
                assert!(!parameters.clear_overpayments);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScenarioConfig = serde_json::from_str(r#"{ "neutral_band_pct": "2" }"#).unwrap();
        assert_eq!(config.neutral_band_pct, dec!(2));
        assert_eq!(config.rate_deltas_pct.len(), 6);
    }
}
