use serde::{Deserialize, Serialize};

use super::definition::{ScenarioConfig, ScenarioDefinition};
use super::evaluate::{RiskTier, ScenarioResult};
use super::generate::run_definitions;
use crate::amortization::{calculate, CalculationResult};
use crate::loan::LoanDetails;
use crate::MortgageResult;

/// Tier counts over a what-if set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub favorable: usize,
    pub neutral: usize,
    pub adverse: usize,
    pub severe: usize,
    pub failed: usize,
    /// Highest tier among completed scenarios; neutral when none completed.
    pub overall: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub base: CalculationResult,
    pub scenarios: Vec<ScenarioResult>,
    pub risk_assessment: RiskAssessment,
    /// Scenario with the lowest total interest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_case: Option<String>,
    /// Scenario with the highest total interest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_case: Option<String>,
}

/// Run arbitrary definitions against `base` and assess the spread of outcomes.
pub fn what_if(base: &LoanDetails, definitions: &[ScenarioDefinition]) -> MortgageResult<AnalysisResult> {
    what_if_with(base, definitions, &ScenarioConfig::default())
}

pub fn what_if_with(
    base: &LoanDetails,
    definitions: &[ScenarioDefinition],
    config: &ScenarioConfig,
) -> MortgageResult<AnalysisResult> {
    let base_result = calculate(base)?;
    let scenarios = run_definitions(base, &base_result, definitions, config);

    let risk_assessment = assess(&scenarios);
    let (best_case, worst_case) = extremes(&scenarios);

    Ok(AnalysisResult {
        base: base_result,
        scenarios,
        risk_assessment,
        best_case,
        worst_case,
    })
}

fn assess(scenarios: &[ScenarioResult]) -> RiskAssessment {
    let mut assessment = RiskAssessment::default();
    let mut highest: Option<RiskTier> = None;

    for scenario in scenarios {
        let Some(evaluation) = scenario.evaluation() else {
            assessment.failed += 1;
            continue;
        };
        let tier = evaluation.metrics.risk;
        match tier {
            RiskTier::Favorable => assessment.favorable += 1,
            RiskTier::Neutral => assessment.neutral += 1,
            RiskTier::Adverse => assessment.adverse += 1,
            RiskTier::Severe => assessment.severe += 1,
        }
        highest = highest.max(Some(tier));
    }

    assessment.overall = highest.unwrap_or_default();
    assessment
}

/// Lowest and highest total interest among completed scenarios, first occurrence on ties.
fn extremes(scenarios: &[ScenarioResult]) -> (Option<String>, Option<String>) {
    let mut best: Option<&ScenarioResult> = None;
    let mut worst: Option<&ScenarioResult> = None;
    let interest = |s: &ScenarioResult| s.evaluation().map(|e| e.calculation.total_interest);

    for scenario in scenarios {
        let Some(value) = interest(scenario) else {
            continue;
        };
        if best.and_then(interest).map_or(true, |b| value < b) {
            best = Some(scenario);
        }
        if worst.and_then(interest).map_or(true, |w| value > w) {
            worst = Some(scenario);
        }
    }

    (best.map(|s| s.name.clone()), worst.map(|s| s.name.clone()))
}
