use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use mortgage_core::loan::LoanDetails;
use mortgage_core::scenarios::{
    generate_rate_change_scenarios_with, generate_stress_test_scenarios_with, what_if_with,
    ScenarioConfig, ScenarioDefinition, ScenarioResult,
};
use mortgage_core::ItemOutcome;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioKindArg {
    /// Shift every rate period by each configured delta
    RateChange,
    /// Mild, moderate and severe rate/income shocks
    Stress,
    /// Custom definitions from --definitions
    WhatIf,
}

/// Arguments for scenario analysis
#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario family to run
    #[arg(long, value_enum)]
    pub kind: ScenarioKindArg,

    /// Path to JSON/YAML base loan file
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON/YAML list of scenario definitions (what-if only)
    #[arg(long)]
    pub definitions: Option<String>,

    /// Path to JSON/YAML scenario configuration (partial allowed)
    #[arg(long)]
    pub config: Option<String>,

    /// Emit full per-scenario calculations instead of summary rows
    #[arg(long)]
    pub detail: bool,
}

pub fn run_scenarios(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base: LoanDetails = input::read_input(args.input.as_deref(), "scenario analysis")?;
    let config: ScenarioConfig = match args.config.as_deref() {
        Some(path) => input::file::read_document(path)?,
        None => ScenarioConfig::default(),
    };

    match args.kind {
        ScenarioKindArg::RateChange => {
            let results = generate_rate_change_scenarios_with(&base, &config)?;
            scenario_set(&results, args.detail)
        }
        ScenarioKindArg::Stress => {
            let results = generate_stress_test_scenarios_with(&base, &config)?;
            scenario_set(&results, args.detail)
        }
        ScenarioKindArg::WhatIf => {
            let path = args
                .definitions
                .as_deref()
                .ok_or("--definitions <file> is required for what-if analysis")?;
            let definitions: Vec<ScenarioDefinition> = input::file::read_document(path)?;
            let analysis = what_if_with(&base, &definitions, &config)?;
            if args.detail {
                return Ok(serde_json::to_value(analysis)?);
            }
            let assessment = &analysis.risk_assessment;
            Ok(json!({
                "best_case": analysis.best_case,
                "worst_case": analysis.worst_case,
                "overall_risk": assessment.overall,
                "favorable": assessment.favorable,
                "neutral": assessment.neutral,
                "adverse": assessment.adverse,
                "severe": assessment.severe,
                "failed": assessment.failed,
                "base_monthly_payment": analysis.base.monthly_payment,
                "base_total_interest": analysis.base.total_interest,
                "results": summary_rows(&analysis.scenarios),
            }))
        }
    }
}

fn scenario_set(results: &[ScenarioResult], detail: bool) -> Result<Value, Box<dyn std::error::Error>> {
    if detail {
        return Ok(json!({ "results": serde_json::to_value(results)? }));
    }
    Ok(json!({ "results": summary_rows(results) }))
}

fn summary_rows(results: &[ScenarioResult]) -> Vec<Value> {
    results
        .iter()
        .map(|r| match &r.outcome {
            ItemOutcome::Completed { result } => json!({
                "name": r.name,
                "status": "completed",
                "monthly_payment": result.calculation.monthly_payment,
                "total_interest": result.calculation.total_interest,
                "interest_delta": result.metrics.interest_delta,
                "interest_delta_pct": result.metrics.interest_delta_pct,
                "term_delta_months": result.metrics.term_delta_months,
                "payment_burden_index": result.metrics.payment_burden_index,
                "risk": result.metrics.risk,
                "reason": Value::Null,
            }),
            ItemOutcome::Failed { reason, .. } => json!({
                "name": r.name,
                "status": "failed",
                "monthly_payment": Value::Null,
                "total_interest": Value::Null,
                "interest_delta": Value::Null,
                "interest_delta_pct": Value::Null,
                "term_delta_months": Value::Null,
                "payment_burden_index": Value::Null,
                "risk": Value::Null,
                "reason": reason,
            }),
        })
        .collect()
}
