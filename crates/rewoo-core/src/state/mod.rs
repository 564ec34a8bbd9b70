//! Orchestration state and the phase state machine.
//!
//! One [`OrchestrationState`] exists per task. The orchestrator owns it and
//! is the only writer; everything else reads it.

pub mod results;

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::TaskError;
use crate::plan::Step;

pub use results::{ResultStore, ResultStoreError};

/// Where a task is in the pipeline.
///
/// Valid transitions:
///
/// ```text
/// planning     -> executing
/// planning     -> synthesizing   (empty plan)
/// executing    -> executing      (more steps left)
/// executing    -> synthesizing
/// synthesizing -> done
/// ```
///
/// `Executing` carries no step index: the next step is always
/// `results.len() + 1`, see [`OrchestrationState::next_step_number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Executing,
    Synthesizing,
    Done,
}

impl Phase {
    /// Check whether `from -> to` is an edge in the phase graph.
    pub fn is_valid_transition(from: Phase, to: Phase) -> bool {
        matches!(
            (from, to),
            (Phase::Planning, Phase::Executing)
                | (Phase::Planning, Phase::Synthesizing)
                | (Phase::Executing, Phase::Executing)
                | (Phase::Executing, Phase::Synthesizing)
                | (Phase::Synthesizing, Phase::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Done
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Planning => "planning",
            Phase::Executing => "executing",
            Phase::Synthesizing => "synthesizing",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Everything known about one task while it is being answered.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    run_id: Uuid,
    task: String,
    plan_text: Option<String>,
    steps: Vec<Step>,
    results: ResultStore,
    answer: Option<String>,
    phase: Phase,
}

impl OrchestrationState {
    /// Fresh state for `task`, in [`Phase::Planning`].
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            task: task.into(),
            plan_text: None,
            steps: Vec::new(),
            results: ResultStore::new(),
            answer: None,
            phase: Phase::Planning,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Raw planner output, once planning has run.
    pub fn plan_text(&self) -> Option<&str> {
        self.plan_text.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 1-based number of the next step to run, or `None` once every step
    /// has a result.
    pub fn next_step_number(&self) -> Option<usize> {
        let k = self.results.len() + 1;
        (k <= self.steps.len()).then_some(k)
    }

    /// The next step to run.
    pub fn next_step(&self) -> Option<&Step> {
        self.next_step_number().map(|k| &self.steps[k - 1])
    }

    /// Whether every parsed step has a result.
    pub fn execution_complete(&self) -> bool {
        self.results.len() == self.steps.len()
    }

    /// Consume the state, returning the answer if synthesis finished.
    pub fn into_answer(self) -> Option<String> {
        self.answer
    }

    pub(crate) fn set_plan(&mut self, plan_text: String, steps: Vec<Step>) {
        self.plan_text = Some(plan_text);
        self.steps = steps;
    }

    pub(crate) fn record_result(
        &mut self,
        variable: &str,
        value: String,
    ) -> Result<usize, ResultStoreError> {
        self.results.insert(variable, value)
    }

    pub(crate) fn set_answer(&mut self, answer: String) {
        self.answer = Some(answer);
    }

    /// Move to `to`, rejecting edges outside the phase graph.
    pub(crate) fn transition(&mut self, to: Phase) -> Result<(), TaskError> {
        if !Phase::is_valid_transition(self.phase, to) {
            return Err(TaskError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::trace!(run_id = %self.run_id, from = %self.phase, to = %to, "phase transition");
        self.phase = to;
        Ok(())
    }
}
