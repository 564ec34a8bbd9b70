//! A single parsed plan step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `Plan: <description> #E<n> = <Capability>[<input>]` clause.
///
/// `input` is kept exactly as the planner wrote it (modulo trim). Evidence
/// references inside it are resolved when the step runs, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Natural-language description of what the step is for.
    pub description: String,
    /// Evidence variable bound to this step's result (e.g. `#E1`).
    pub variable: String,
    /// Name of the capability to dispatch to (e.g. `LLM`).
    pub capability: String,
    /// Unsubstituted capability input.
    pub input: String,
}

impl Step {
    pub fn new(
        description: impl Into<String>,
        variable: impl Into<String>,
        capability: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            variable: variable.into(),
            capability: capability.into(),
            input: input.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plan: {} {} = {}[{}]",
            self.description, self.variable, self.capability, self.input
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_plan_grammar() {
        let step = Step::new("look it up", "#E1", "Google", "rust release date");
        assert_eq!(
            step.to_string(),
            "Plan: look it up #E1 = Google[rust release date]"
        );
    }
}
