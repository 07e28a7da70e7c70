use clap::Args;
use serde_json::{json, Value};

use mortgage_core::loan::LoanDetails;
use mortgage_core::validation::validate;

use crate::input;

/// Arguments for checking a loan file without calculating it
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON/YAML loan file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanDetails = input::read_input(args.input.as_deref(), "validation")?;
    let outcome = validate(&loan);

    let violations: Vec<Value> = outcome
        .violations
        .iter()
        .map(|v| json!({ "field": v.field(), "message": v.to_string() }))
        .collect();
    Ok(json!({
        "valid": outcome.is_valid(),
        "violations": violations,
    }))
}
