pub mod evaluator;
pub mod generator;

pub use evaluator::{evaluate_scenarios, ScenarioResult, ScenarioSet};
pub use generator::{generate_scenarios, ScenarioDefinition, ScenarioId};
