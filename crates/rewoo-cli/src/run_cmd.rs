//! `rewoo run`, `rewoo plan` and `rewoo capabilities`.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;

use rewoo_core::capability::{CapabilityRegistry, ReasoningCapability, SearchCapability};
use rewoo_core::llm::{OpenAiChat, TextGenerator};
use rewoo_core::orchestrator::{Orchestrator, ProgressEvent, ProgressKind};
use rewoo_core::search::TavilySearch;
use rewoo_core::solver::build_transcript;
use rewoo_core::state::OrchestrationState;

use crate::config::RewooConfig;

/// Longest evidence/input excerpt shown on a progress line.
const EXCERPT_CHARS: usize = 120;

/// Options for `rewoo run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the raw plan and the final transcript.
    pub show_plan: bool,
    /// Suppress progress lines.
    pub quiet: bool,
    /// Emit progress as JSON lines instead of text.
    pub json: bool,
}

/// Build the capability registry and orchestrator from resolved config.
pub fn build_orchestrator(config: &RewooConfig) -> Result<Orchestrator> {
    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAiChat::new(config.llm.clone()).context("failed to create text generator")?,
    );

    let mut registry = CapabilityRegistry::new();
    registry.register(ReasoningCapability::named(
        config.reasoning_name.clone(),
        Arc::clone(&generator),
    ));

    match &config.search {
        Some(search_config) => {
            let backend = TavilySearch::new(search_config.clone())
                .context("failed to create search backend")?;
            let replaced = registry.register(SearchCapability::named(
                config.search_name.clone(),
                Arc::new(backend),
            ));
            if replaced.is_some() {
                bail!(
                    "search and reasoning capabilities are both named {:?}; \
                     give them distinct names in the [capabilities] config section",
                    config.search_name
                );
            }
        }
        None => {
            tracing::warn!("no search API key configured, search capability disabled");
        }
    }

    Ok(Orchestrator::new(generator, Arc::new(registry)))
}

/// Execute `rewoo run`: answer `task`, printing the answer to stdout.
pub async fn run_task(orchestrator: Orchestrator, task: &str, options: RunOptions) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let orchestrator = orchestrator.with_progress(tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if options.quiet {
                continue;
            }
            if options.json {
                if let Ok(line) = serde_json::to_string(&event) {
                    eprintln!("{line}");
                }
            } else if let Some(line) = render_event(&event.kind, options.show_plan) {
                eprintln!("{line}");
            }
        }
    });

    let result = orchestrator
        .run_to_completion(OrchestrationState::new(task))
        .await;

    // Closing the channel lets the printer drain and exit.
    drop(orchestrator);
    let _ = printer.await;

    let state = result.map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(format!("task failed ({kind})"))
    })?;

    if options.show_plan {
        eprintln!("--- transcript ---");
        eprintln!("{}", build_transcript(state.steps(), state.results()));
        eprintln!("------------------");
    }

    println!("{}", state.answer().unwrap_or_default());
    Ok(())
}

/// Execute `rewoo plan`: plan only and print the parsed steps.
pub async fn run_plan(orchestrator: &Orchestrator, task: &str) -> Result<()> {
    let (plan_text, steps) = orchestrator
        .plan(task)
        .await
        .context("planning failed")?;

    if steps.is_empty() {
        println!("No steps could be parsed from the plan. Raw planner output:");
        println!("{plan_text}");
        return Ok(());
    }

    for step in &steps {
        let known = if orchestrator.registry().contains(&step.capability) {
            ""
        } else {
            "  (unknown capability)"
        };
        println!("{} = {}[{}]{known}", step.variable, step.capability, step.input);
        println!("    {}", step.description);
    }
    Ok(())
}

/// Execute `rewoo capabilities`.
pub fn run_capabilities(orchestrator: &Orchestrator) {
    for (name, description) in orchestrator.registry().describe() {
        println!("{name}\n    {description}");
    }
}

/// One human-readable line per event, or `None` for events not shown.
pub fn render_event(kind: &ProgressKind, show_plan: bool) -> Option<String> {
    match kind {
        ProgressKind::Planned { plan_text, steps } => {
            let mut line = format!("planned {} step(s)", steps.len());
            if show_plan {
                line.push_str("\n--- plan ---\n");
                line.push_str(plan_text.trim());
                line.push_str("\n------------");
            }
            Some(line)
        }
        ProgressKind::StepStarted {
            number,
            total,
            variable,
            capability,
            input,
        } => Some(format!(
            "[{number}/{total}] {variable} = {capability}[{}]",
            excerpt(input)
        )),
        ProgressKind::StepCompleted {
            variable, result, ..
        } => Some(format!("      {variable} -> {}", excerpt(result))),
        ProgressKind::Synthesizing => Some("synthesizing answer".to_string()),
        ProgressKind::Finished { .. } => None,
    }
}

/// First line of `text`, cut to [`EXCERPT_CHARS`] characters.
fn excerpt(text: &str) -> String {
    let mut lines = text.lines();
    let first_line = lines.next().unwrap_or_default();
    let mut out: String = first_line.chars().take(EXCERPT_CHARS).collect();
    if first_line.chars().count() > EXCERPT_CHARS || lines.next().is_some() {
        out.push_str("...");
    }
    out
}
