use log::debug;

use super::definition::{ScenarioConfig, ScenarioDefinition};
use super::evaluate::{evaluate, ScenarioResult};
use crate::amortization::{calculate, CalculationResult};
use crate::batch::map_items;
use crate::loan::LoanDetails;
use crate::MortgageResult;

/// Rate-change scenarios for the default set of deltas.
pub fn generate_rate_change_scenarios(base: &LoanDetails) -> MortgageResult<Vec<ScenarioResult>> {
    generate_rate_change_scenarios_with(base, &ScenarioConfig::default())
}

/// One scenario per configured delta, applied to every rate period.
pub fn generate_rate_change_scenarios_with(
    base: &LoanDetails,
    config: &ScenarioConfig,
) -> MortgageResult<Vec<ScenarioResult>> {
    let definitions: Vec<ScenarioDefinition> = config
        .rate_deltas_pct
        .iter()
        .map(|delta| ScenarioDefinition::rate_change(*delta))
        .collect();
    let base_result = calculate(base)?;
    Ok(run_definitions(base, &base_result, &definitions, config))
}

/// Mild, moderate and severe stress scenarios.
pub fn generate_stress_test_scenarios(base: &LoanDetails) -> MortgageResult<Vec<ScenarioResult>> {
    generate_stress_test_scenarios_with(base, &ScenarioConfig::default())
}

pub fn generate_stress_test_scenarios_with(
    base: &LoanDetails,
    config: &ScenarioConfig,
) -> MortgageResult<Vec<ScenarioResult>> {
    let definitions: Vec<ScenarioDefinition> = config
        .stress_severities
        .iter()
        .map(|severity| ScenarioDefinition::stress_test(*severity))
        .collect();
    let base_result = calculate(base)?;
    Ok(run_definitions(base, &base_result, &definitions, config))
}

pub(crate) fn run_definitions(
    base: &LoanDetails,
    base_result: &CalculationResult,
    definitions: &[ScenarioDefinition],
    config: &ScenarioConfig,
) -> Vec<ScenarioResult> {
    debug!("evaluating {} scenarios", definitions.len());
    map_items(definitions, |definition| {
        evaluate(base, base_result, definition, config)
    })
}
