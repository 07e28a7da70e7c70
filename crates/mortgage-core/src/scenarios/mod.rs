//! Rate-change, stress-test and custom what-if variants of a base loan.
//!
//! Each scenario clones the base, mutates it, runs the single-loan pipeline
//! and reports deltas against the base calculation. An invalid base blocks
//! the whole set; a failing scenario is reported in its own item.

pub mod definition;
pub mod evaluate;
pub mod generate;
pub mod what_if;

pub use definition::{
    ScenarioConfig, ScenarioDefinition, ScenarioKind, ScenarioParameters, StressProfile,
    StressSeverity,
};
pub use evaluate::{classify, RiskTier, ScenarioEvaluation, ScenarioMetrics, ScenarioResult};
pub use generate::{
    generate_rate_change_scenarios, generate_rate_change_scenarios_with,
    generate_stress_test_scenarios, generate_stress_test_scenarios_with,
};
pub use what_if::{what_if, what_if_with, AnalysisResult, RiskAssessment};
