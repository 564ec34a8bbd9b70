//! Step grammar parser.
//!
//! Recognizes, anywhere in the plan text and in order of appearance:
//!
//! ```text
//! Plan: <description> #E<n> = <Capability>[<input>]
//! ```
//!
//! - `<n>` is a positive integer.
//! - `<Capability>` is a word (`\w+`), captured verbatim. Whether it names a
//!   registered capability is checked at dispatch time, not here.
//! - `<input>` runs to the first `]`. Nested brackets are not supported.
//! - The description is matched lazily on the clause's own line, so several
//!   clauses on one line stay separate and a description may mention an
//!   earlier variable.
//!
//! Text that contains no clause parses to an empty plan. That is not an
//! error: the orchestrator goes straight to synthesis.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::step::Step;

static STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Plan:\s*(?P<description>[^\n]*?)\s*(?P<variable>#E[1-9][0-9]*)\s*=\s*(?P<capability>\w+)\s*\[(?P<input>[^\]]+)\]",
    )
    .expect("step pattern is a valid regex")
});

/// Parse plan text into an ordered list of steps.
///
/// A variable bound by more than one clause keeps its first binding; later
/// clauses re-binding it are dropped so that each variable names exactly one
/// result.
pub fn parse_plan(text: &str) -> Vec<Step> {
    let mut seen = HashSet::new();
    let mut steps = Vec::new();

    for caps in STEP_PATTERN.captures_iter(text) {
        let variable = &caps["variable"];
        if !seen.insert(variable.to_string()) {
            tracing::warn!(
                variable = %variable,
                capability = %&caps["capability"],
                "dropping plan step that re-binds an existing variable"
            );
            continue;
        }

        steps.push(Step {
            description: caps["description"].trim().to_string(),
            variable: variable.to_string(),
            capability: caps["capability"].to_string(),
            input: caps["input"].trim().to_string(),
        });
    }

    tracing::debug!(steps = steps.len(), "parsed plan");
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clauses_in_order() {
        let text = "\
Plan: Find the winner of the 2024 men's Australian Open. #E1 = Google[2024 Australian Open men's winner]
Plan: Find the winner's hometown. #E2 = Google[hometown of #E1]
Plan: Extract the exact town. #E3 = LLM[Given #E2, what is the exact hometown of #E1?]
";
        let steps = parse_plan(text);
        assert_eq!(steps.len(), 3);

        assert_eq!(
            steps[0],
            Step::new(
                "Find the winner of the 2024 men's Australian Open.",
                "#E1",
                "Google",
                "2024 Australian Open men's winner",
            )
        );
        assert_eq!(steps[1].variable, "#E2");
        assert_eq!(steps[1].input, "hometown of #E1");
        assert_eq!(steps[2].capability, "LLM");
        assert_eq!(
            steps[2].input,
            "Given #E2, what is the exact hometown of #E1?"
        );
    }

    #[test]
    fn round_trips_generated_clauses() {
        for n in 1..=8 {
            let text: String = (1..=n)
                .map(|i| format!("Plan: step number {i} #E{i} = Cap{i}[input for {i}]\n"))
                .collect();
            let steps = parse_plan(&text);
            assert_eq!(steps.len(), n, "expected {n} steps");
            for (i, step) in steps.iter().enumerate() {
                let k = i + 1;
                assert_eq!(step.description, format!("step number {k}"));
                assert_eq!(step.variable, format!("#E{k}"));
                assert_eq!(step.capability, format!("Cap{k}"));
                assert_eq!(step.input, format!("input for {k}"));
            }
        }
    }

    #[test]
    fn clauses_on_a_single_line_are_separate_steps() {
        let text = r"Plan: add #E1 = Reason[What is 2+3] \n Plan: double result #E2 = Reason[Double #E1]";
        let steps = parse_plan(text);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], Step::new("add", "#E1", "Reason", "What is 2+3"));
        assert_eq!(
            steps[1],
            Step::new("double result", "#E2", "Reason", "Double #E1")
        );
    }

    #[test]
    fn text_without_clauses_is_an_empty_plan() {
        assert!(parse_plan("").is_empty());
        assert!(parse_plan("I cannot make a plan for this.").is_empty());
        assert!(parse_plan("Plan: think hard about it").is_empty());
    }

    #[test]
    fn trims_but_keeps_inner_whitespace() {
        let steps = parse_plan("Plan:    spaced   out   #E1   =   LLM[  a   b  ]");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].description, "spaced   out");
        assert_eq!(steps[0].input, "a   b");
    }

    #[test]
    fn description_may_reference_earlier_variables() {
        let text = "Plan: a #E1 = LLM[x]\nPlan: combine #E1 with more data #E2 = LLM[y #E1]";
        let steps = parse_plan(text);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].description, "combine #E1 with more data");
        assert_eq!(steps[1].variable, "#E2");
    }

    #[test]
    fn input_may_span_lines() {
        let steps = parse_plan("Plan: multi #E1 = LLM[first line\nsecond line]");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].input, "first line\nsecond line");
    }

    #[test]
    fn input_ends_at_first_closing_bracket() {
        let steps = parse_plan("Plan: nested #E1 = LLM[a [b] c]");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].input, "a [b");
    }

    #[test]
    fn unknown_capability_names_are_kept_verbatim() {
        let steps = parse_plan("Plan: compute #E1 = WolframAlpha[2 + 2]");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].capability, "WolframAlpha");
    }

    #[test]
    fn rebound_variable_keeps_first_binding() {
        let text = "\
Plan: first #E1 = LLM[one]
Plan: again #E1 = LLM[two]
Plan: next #E2 = LLM[three]
";
        let steps = parse_plan(text);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].input, "one");
        assert_eq!(steps[1].variable, "#E2");
    }

    #[test]
    fn zero_is_not_a_variable_number() {
        assert!(parse_plan("Plan: nothing #E0 = LLM[x]").is_empty());
    }

    #[test]
    fn empty_brackets_do_not_form_a_step() {
        assert!(parse_plan("Plan: blank #E1 = LLM[]").is_empty());
    }
}
