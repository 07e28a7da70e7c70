use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use mortgage_core::comparison::{compare_with, ComparisonConfig, LabeledLoan};
use mortgage_core::ItemOutcome;

use crate::input;

/// Arguments for comparing loan offers
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON/YAML file: a list of {label, loan} or {"loans": [...]}
    #[arg(long)]
    pub input: Option<String>,

    /// Largest comparison set accepted
    #[arg(long)]
    pub max_loans: Option<usize>,

    /// Path to JSON/YAML comparison configuration (partial allowed)
    #[arg(long)]
    pub config: Option<String>,

    /// Emit full per-loan calculations instead of summary rows
    #[arg(long)]
    pub detail: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompareInput {
    List(Vec<LabeledLoan>),
    Wrapped { loans: Vec<LabeledLoan> },
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans = match input::read_input::<CompareInput>(args.input.as_deref(), "loan comparison")? {
        CompareInput::List(loans) | CompareInput::Wrapped { loans } => loans,
    };
    let mut config: ComparisonConfig = match args.config.as_deref() {
        Some(path) => input::file::read_document(path)?,
        None => ComparisonConfig::default(),
    };
    if let Some(max) = args.max_loans {
        config.max_loans = max;
    }

    let result = compare_with(&loans, &config)?;
    if args.detail {
        return Ok(serde_json::to_value(result)?);
    }

    let rows: Vec<Value> = result
        .loans
        .iter()
        .map(|l| match &l.outcome {
            ItemOutcome::Completed { result } => json!({
                "label": l.label,
                "status": "completed",
                "monthly_payment": result.monthly_payment,
                "total_interest": result.total_interest,
                "total_fees": result.total_fees,
                "total_cost": result.total_cost(),
                "number_of_payments": result.number_of_payments,
                "reason": Value::Null,
            }),
            ItemOutcome::Failed { reason, .. } => json!({
                "label": l.label,
                "status": "failed",
                "monthly_payment": Value::Null,
                "total_interest": Value::Null,
                "total_fees": Value::Null,
                "total_cost": Value::Null,
                "number_of_payments": Value::Null,
                "reason": reason,
            }),
        })
        .collect();

    let summary = &result.summary;
    Ok(json!({
        "best_by_monthly_payment": summary.best_by_monthly_payment,
        "best_by_total_interest": summary.best_by_total_interest,
        "best_by_total_cost": summary.best_by_total_cost,
        "total_savings": summary.total_savings,
        "completed": summary.completed,
        "failed": summary.failed,
        "results": rows,
    }))
}
