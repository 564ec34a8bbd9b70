//! Plans: the step grammar, the parsed step type, and the planner prompt.

pub mod parser;
pub mod prompt;
pub mod step;

pub use parser::parse_plan;
pub use prompt::build_planner_prompt;
pub use step::Step;
