mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::calculate::CalculateArgs;
use commands::compare::CompareArgs;
use commands::scenarios::ScenarioArgs;
use commands::validate::ValidateArgs;

/// Mortgage amortization, scenario and comparison analysis
#[derive(Parser)]
#[command(
    name = "mtg",
    version,
    about = "Mortgage amortization, scenario and comparison analysis",
    long_about = "A CLI for mortgage calculations with decimal precision. Builds \
                  month-by-month ledgers with rate resets and overpayments, runs \
                  rate-change, stress and what-if scenarios, and compares loan offers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Decimal places for money and rates in the output
    #[arg(long, default_value_t = 2, global = true)]
    dp: u32,

    /// Log calculation steps to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortize a single loan
    Calculate(CalculateArgs),
    /// Check a loan file and list every violation
    Validate(ValidateArgs),
    /// Run rate-change, stress-test or what-if scenarios against a base loan
    Scenarios(ScenarioArgs),
    /// Compare 2 to 5 loan offers
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args),
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Version => {
            println!("mtg {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(mut value) => {
            output::round_decimals(&mut value, cli.dp);
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
