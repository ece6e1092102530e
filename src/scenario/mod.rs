mod context;
mod runner;
mod step;

pub use context::ScenarioContext;
pub use runner::{Scenario, ScenarioError, ScenarioReport, StepError};
pub use step::Step;
