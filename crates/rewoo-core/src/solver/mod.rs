//! Synthesis: turn the plan and its evidence into the final answer.
//!
//! The transcript restates every step with evidence inlined. A step's own
//! variable label is substituted too, so an executed step reads
//! `5 = LLM[What is 2+3]` rather than `#E1 = LLM[What is 2+3]`.

use anyhow::{Context, Result};

use crate::llm::TextGenerator;
use crate::plan::Step;
use crate::state::{OrchestrationState, ResultStore};
use crate::substitute::substitute;

/// Render the plan with evidence inlined, one entry per step:
///
/// ```text
/// Plan: <description>
/// <label> = <capability>[<input>]
/// ```
pub fn build_transcript(steps: &[Step], results: &ResultStore) -> String {
    steps
        .iter()
        .map(|step| {
            format!(
                "Plan: {}\n{} = {}[{}]",
                step.description,
                substitute(&step.variable, results),
                step.capability,
                substitute(&step.input, results),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Embed `transcript` and `task` in the solver instructions.
pub fn build_solver_prompt(task: &str, transcript: &str) -> String {
    format!(
        "Solve the following task or problem. To solve the problem, we have made a step-by-step \
         Plan and retrieved corresponding Evidence for each Plan. Use them with caution since long \
         evidence might contain irrelevant information.\n\
         \n\
         {transcript}\n\
         \n\
         Now solve the question or task according to the provided Evidence above. Respond with \
         the answer directly with no extra words.\n\
         \n\
         Task: {task}\n\
         Response:"
    )
}

/// Make the single synthesis call for `state`. The reply is the answer,
/// unmodified.
pub async fn synthesize(generator: &dyn TextGenerator, state: &OrchestrationState) -> Result<String> {
    let transcript = build_transcript(state.steps(), state.results());
    let prompt = build_solver_prompt(state.task(), &transcript);
    generator
        .generate(&prompt)
        .await
        .with_context(|| format!("text generator {} failed", generator.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_inlines_evidence() {
        let steps = vec![
            Step::new("add", "#E1", "Reason", "What is 2+3"),
            Step::new("double result", "#E2", "Reason", "Double #E1"),
        ];
        let mut results = ResultStore::new();
        results.insert("#E1", "5").unwrap();
        results.insert("#E2", "10").unwrap();

        let transcript = build_transcript(&steps, &results);
        assert_eq!(
            transcript,
            "Plan: add\n5 = Reason[What is 2+3]\nPlan: double result\n10 = Reason[Double 5]"
        );
        assert!(!transcript.contains("#E"));
    }

    #[test]
    fn transcript_keeps_description_verbatim() {
        let steps = vec![
            Step::new("a", "#E1", "LLM", "x"),
            Step::new("use #E1 again", "#E2", "LLM", "#E1"),
        ];
        let mut results = ResultStore::new();
        results.insert("#E1", "v").unwrap();
        results.insert("#E2", "w").unwrap();

        let transcript = build_transcript(&steps, &results);
        assert!(transcript.contains("Plan: use #E1 again\nw = LLM[v]"));
    }

    #[test]
    fn empty_plan_has_empty_transcript() {
        assert_eq!(build_transcript(&[], &ResultStore::new()), "");
    }

    #[test]
    fn solver_prompt_contains_transcript_and_task() {
        let prompt = build_solver_prompt("A + B, then double it.", "Plan: add\n5 = Reason[2+3]");
        assert!(prompt.contains("Plan: add\n5 = Reason[2+3]"));
        assert!(prompt.contains("Task: A + B, then double it.\nResponse:"));
        assert!(prompt.contains("with caution"));
        assert!(prompt.contains("no extra words"));
    }
}
