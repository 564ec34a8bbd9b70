//! Planner prompt construction.
//!
//! Pure string assembly; the orchestrator sends the result to the text
//! generator and feeds the reply to [`super::parse_plan`].

use crate::capability::{CapabilityKind, CapabilityRegistry};

const PLANNER_INTRO: &str = "\
For the following task, make plans that can solve the problem step by step. \
For each plan, indicate which external tool together with tool input to retrieve evidence. \
You can store the evidence into a variable #E that can be called by later tools. \
(Plan, #E1, Plan, #E2, Plan, ...)
";

const PLANNER_RULES: &str = "\
Begin!
Describe your plans with rich details. Each Plan should be followed by only one #E. \
Later tool inputs may use any #E defined by an earlier Plan, never a later one.
";

/// Build the planner prompt for `task`, listing every capability in
/// `registry` as a tool the plan may use.
pub fn build_planner_prompt(task: &str, registry: &CapabilityRegistry) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(PLANNER_INTRO);
    prompt.push('\n');

    prompt.push_str("Tools can be one of the following:\n");
    for (i, (name, description)) in registry.describe().into_iter().enumerate() {
        prompt.push_str(&format!("({}) {name}[input]: {description}\n", i + 1));
    }
    prompt.push('\n');

    if let Some(example) = worked_example(
        registry.first_of_kind(CapabilityKind::Search),
        registry.first_of_kind(CapabilityKind::Reasoning),
    ) {
        prompt.push_str(&example);
        prompt.push('\n');
    }
    prompt.push_str(PLANNER_RULES);
    prompt.push('\n');
    prompt.push_str(&format!("Task: {task}\n"));

    prompt
}

/// An example plan that only uses the names actually registered.
///
/// `None` when neither a search nor a reasoning capability is registered.
fn worked_example(search: Option<&str>, reasoning: Option<&str>) -> Option<String> {
    let example = match (search, reasoning) {
        (Some(search), reasoning) => {
            let mut lines = format!(
                "For example,
Task: Which of the two cities that hosted the 2012 and 2016 Summer Olympics has the larger population today?
Plan: Look up the host city of the 2012 Summer Olympics. #E1 = {search}[2012 Summer Olympics host city]
Plan: Look up the host city of the 2016 Summer Olympics. #E2 = {search}[2016 Summer Olympics host city]
Plan: Find the current population of the first host city. #E3 = {search}[current population of #E1]
Plan: Find the current population of the second host city. #E4 = {search}[current population of #E2]
"
            );
            if let Some(reasoning) = reasoning {
                lines.push_str(&format!(
                    "Plan: Compare the two populations and name the larger city. \
#E5 = {reasoning}[Which is larger: #E1 with #E3 or #E2 with #E4?]\n"
                ));
            }
            lines
        }
        (None, Some(reasoning)) => format!(
            "For example,
Task: A train leaves at 3:40 pm and the trip takes 2 hours 35 minutes. Does it arrive before 6:30 pm?
Plan: Work out the arrival time. #E1 = {reasoning}[What time is 2 hours 35 minutes after 3:40 pm?]
Plan: Compare the arrival time with 6:30 pm. #E2 = {reasoning}[Is #E1 earlier than 6:30 pm?]
"
        ),
        (None, None) => return None,
    };
    Some(example)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, ReasoningCapability, SearchCapability};
    use crate::llm::TextGenerator;
    use crate::search::{SearchBackend, SearchHit};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Capability for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn lists_capabilities_in_name_order() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Named("LLM", "Reasons about anything."));
        registry.register(Named("Google", "Searches the web."));

        let prompt = build_planner_prompt("what is 2+2?", &registry);
        let google = prompt
            .find("(1) Google[input]: Searches the web.")
            .expect("Google listed first");
        let llm = prompt
            .find("(2) LLM[input]: Reasons about anything.")
            .expect("LLM listed second");
        assert!(google < llm);
    }

    #[test]
    fn ends_with_the_task() {
        let registry = CapabilityRegistry::new();
        let prompt = build_planner_prompt("find the tallest mountain", &registry);
        assert!(prompt.trim_end().ends_with("Task: find the tallest mountain"));
        assert!(prompt.contains("#E1"));
    }

    struct Silent;

    #[async_trait]
    impl TextGenerator for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    #[async_trait]
    impl SearchBackend for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn example_uses_only_registered_reasoning_name() {
        let mut registry = CapabilityRegistry::new();
        registry.register(ReasoningCapability::named("Think", Arc::new(Silent)));

        let prompt = build_planner_prompt("t", &registry);
        assert!(prompt.contains("For example,"));
        assert!(prompt.contains("#E1 = Think["));
        assert!(prompt.contains("#E2 = Think["));
        assert!(!prompt.contains("= Google["), "prompt: {prompt}");
        assert!(!prompt.contains("= LLM["), "prompt: {prompt}");
    }

    #[test]
    fn example_uses_renamed_builtins() {
        let mut registry = CapabilityRegistry::new();
        registry.register(SearchCapability::named("Web", Arc::new(Silent)));
        registry.register(ReasoningCapability::named("Think", Arc::new(Silent)));

        let prompt = build_planner_prompt("t", &registry);
        assert!(prompt.contains("#E1 = Web[2012 Summer Olympics host city]"));
        assert!(prompt.contains("#E5 = Think[Which is larger"));
        assert!(!prompt.contains("= Google["));
        assert!(!prompt.contains("= LLM["));
    }

    #[test]
    fn search_only_example_has_no_reasoning_step() {
        let mut registry = CapabilityRegistry::new();
        registry.register(SearchCapability::new(Arc::new(Silent)));

        let prompt = build_planner_prompt("t", &registry);
        assert!(prompt.contains("#E4 = Google[current population of #E2]"));
        assert!(!prompt.contains("#E5"));
    }

    #[test]
    fn no_example_without_builtin_kinds() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Named("Calculator", "Evaluates arithmetic."));

        let prompt = build_planner_prompt("t", &registry);
        assert!(!prompt.contains("For example,"));
        assert!(prompt.contains("(1) Calculator[input]: Evaluates arithmetic."));
    }
}
