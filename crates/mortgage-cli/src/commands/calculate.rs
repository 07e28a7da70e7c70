use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::amortization::analyze_loan;
use mortgage_core::loan::{LoanDetails, OverpaymentEffect, OverpaymentPlan};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScheduleDetail {
    /// Totals only
    None,
    /// Totals plus yearly buckets
    Yearly,
    /// Totals, yearly buckets and every monthly entry
    Monthly,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EffectArg {
    ReduceTerm,
    ReducePayment,
}

impl From<EffectArg> for OverpaymentEffect {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::ReduceTerm => OverpaymentEffect::ReduceTerm,
            EffectArg::ReducePayment => OverpaymentEffect::ReducePayment,
        }
    }
}

/// Arguments for a single-loan calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 4.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Loan start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Extra amount paid every month from the first payment
    #[arg(long)]
    pub monthly_overpayment: Option<Decimal>,

    /// What a monthly overpayment does to the loan
    #[arg(long, value_enum, default_value = "reduce-term")]
    pub effect: EffectArg,

    /// How much of the ledger to include
    #[arg(long, value_enum, default_value = "yearly")]
    pub schedule: ScheduleDetail,

    /// Path to JSON/YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = if args.input.is_some() || args.principal.is_none() {
        input::read_input::<LoanDetails>(args.input.as_deref(), "loan calculation")?
    } else {
        loan_from_flags(&args)?
    };

    let output = analyze_loan(&loan)?;
    let mut value = serde_json::to_value(output)?;
    trim_schedule(&mut value, args.schedule);
    Ok(value)
}

fn loan_from_flags(args: &CalculateArgs) -> Result<LoanDetails, Box<dyn std::error::Error>> {
    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let term_years = args
        .term_years
        .ok_or("--term-years is required (or provide --input)")?;
    let start_date = args
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut loan = LoanDetails::fixed_rate(principal, rate, term_years, start_date);
    if let Some(amount) = args.monthly_overpayment {
        loan = loan.with_overpayment(OverpaymentPlan::monthly(amount, 1, None, args.effect.into()));
    }
    Ok(loan)
}

fn trim_schedule(value: &mut Value, detail: ScheduleDetail) {
    let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) else {
        return;
    };
    match detail {
        ScheduleDetail::None => {
            result.remove("amortization_schedule");
            result.remove("yearly_data");
        }
        ScheduleDetail::Yearly => {
            result.remove("amortization_schedule");
        }
        ScheduleDetail::Monthly => {}
    }
}
