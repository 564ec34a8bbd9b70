//! The control loop: plan, execute steps in order, synthesize.
//!
//! Each call to [`Orchestrator::advance`] performs exactly one phase
//! transition on a caller-held [`OrchestrationState`]. [`Orchestrator::run`]
//! owns a fresh state and advances it until [`Phase::Done`].
//!
//! Steps run strictly one after another. The step to run is always number
//! `results.len() + 1`; there is no separate cursor to drift out of sync
//! with the result store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::capability::{CapabilityRegistry, DispatchError};
use crate::error::TaskError;
use crate::llm::TextGenerator;
use crate::plan::{Step, build_planner_prompt, parse_plan};
use crate::solver;
use crate::state::{OrchestrationState, Phase};
use crate::substitute::substitute;

/// A progress notification for whoever is driving the task.
///
/// The wording of any field is not a contract; consumers should display
/// events, not parse them.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ProgressKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressKind {
    /// The planner replied and its text was parsed.
    Planned { plan_text: String, steps: Vec<Step> },
    /// A step is about to be dispatched with its substituted input.
    StepStarted {
        number: usize,
        total: usize,
        variable: String,
        capability: String,
        input: String,
    },
    /// A step's result was recorded.
    StepCompleted {
        number: usize,
        variable: String,
        result: String,
    },
    /// All steps are done; the solver call is next.
    Synthesizing,
    /// The answer is set.
    Finished { answer: String },
}

/// Drives tasks through planning, execution and synthesis.
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    registry: Arc<CapabilityRegistry>,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl Orchestrator {
    /// `generator` writes plans and answers; `registry` runs steps.
    pub fn new(generator: Arc<dyn TextGenerator>, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            generator,
            registry,
            progress: None,
        }
    }

    /// Send a [`ProgressEvent`] on `tx` at every transition.
    ///
    /// A dropped receiver is not an error; events are simply lost.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Answer `task`. Returns the answer or the error that aborted the task.
    pub async fn run(&self, task: &str) -> Result<String, TaskError> {
        let state = self.run_to_completion(OrchestrationState::new(task)).await?;
        // Done is only reached after the answer is set.
        Ok(state.into_answer().unwrap_or_default())
    }

    /// Advance `state` until [`Phase::Done`] and hand it back.
    pub async fn run_to_completion(
        &self,
        mut state: OrchestrationState,
    ) -> Result<OrchestrationState, TaskError> {
        tracing::info!(run_id = %state.run_id(), task = %state.task(), "task started");

        while !state.phase().is_terminal() {
            if let Err(e) = self.advance(&mut state).await {
                tracing::error!(
                    run_id = %state.run_id(),
                    phase = %state.phase(),
                    kind = %e.kind(),
                    completed_steps = state.results().len(),
                    error = %e,
                    "task failed"
                );
                return Err(e);
            }
        }

        tracing::info!(run_id = %state.run_id(), steps = state.steps().len(), "task finished");
        Ok(state)
    }

    /// Plan only: prompt the generator and parse its reply.
    ///
    /// Returns the raw plan text and the parsed steps.
    pub async fn plan(&self, task: &str) -> Result<(String, Vec<Step>), TaskError> {
        let prompt = build_planner_prompt(task, &self.registry);
        let plan_text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(TaskError::PlanningFailure)?;
        let steps = parse_plan(&plan_text);
        Ok((plan_text, steps))
    }

    /// Perform one transition and return the phase it landed in.
    ///
    /// On error the state is left as it was before the failing operation:
    /// in particular the result store holds exactly the steps that
    /// completed.
    pub async fn advance(&self, state: &mut OrchestrationState) -> Result<Phase, TaskError> {
        match state.phase() {
            Phase::Planning => self.plan_phase(state).await?,
            Phase::Executing => self.execute_phase(state).await?,
            Phase::Synthesizing => self.synthesize_phase(state).await?,
            Phase::Done => {}
        }
        Ok(state.phase())
    }

    async fn plan_phase(&self, state: &mut OrchestrationState) -> Result<(), TaskError> {
        let (plan_text, steps) = self.plan(state.task()).await?;

        if steps.is_empty() {
            tracing::warn!(
                run_id = %state.run_id(),
                "plan contains no steps, synthesizing directly"
            );
        } else {
            tracing::info!(run_id = %state.run_id(), steps = steps.len(), "plan parsed");
        }

        self.emit(
            state,
            ProgressKind::Planned {
                plan_text: plan_text.clone(),
                steps: steps.clone(),
            },
        );

        let next = if steps.is_empty() {
            Phase::Synthesizing
        } else {
            Phase::Executing
        };
        state.set_plan(plan_text, steps);
        state.transition(next)?;
        if next == Phase::Synthesizing {
            self.emit(state, ProgressKind::Synthesizing);
        }
        Ok(())
    }

    async fn execute_phase(&self, state: &mut OrchestrationState) -> Result<(), TaskError> {
        let Some(number) = state.next_step_number() else {
            state.transition(Phase::Synthesizing)?;
            self.emit(state, ProgressKind::Synthesizing);
            return Ok(());
        };
        let total = state.steps().len();
        let step = state.steps()[number - 1].clone();
        let input = substitute(&step.input, state.results());

        tracing::info!(
            run_id = %state.run_id(),
            step = number,
            total,
            variable = %step.variable,
            capability = %step.capability,
            "executing step"
        );
        self.emit(
            state,
            ProgressKind::StepStarted {
                number,
                total,
                variable: step.variable.clone(),
                capability: step.capability.clone(),
                input: input.clone(),
            },
        );

        let result = match self.registry.dispatch(&step.capability, &input).await {
            Ok(result) => result,
            Err(DispatchError::UnknownCapability { registered, .. }) => {
                return Err(TaskError::UnknownCapability {
                    variable: step.variable,
                    capability: step.capability,
                    registered,
                });
            }
            Err(DispatchError::Failed { source, .. }) => {
                return Err(TaskError::CapabilityDispatchFailure {
                    variable: step.variable,
                    capability: step.capability,
                    source,
                });
            }
        };

        let recorded = state.record_result(&step.variable, result.clone())?;
        debug_assert_eq!(recorded, number, "result store must grow by one per step");

        tracing::debug!(
            run_id = %state.run_id(),
            variable = %step.variable,
            result_len = result.len(),
            "step result recorded"
        );
        self.emit(
            state,
            ProgressKind::StepCompleted {
                number,
                variable: step.variable,
                result,
            },
        );

        if state.execution_complete() {
            state.transition(Phase::Synthesizing)?;
            self.emit(state, ProgressKind::Synthesizing);
        } else {
            state.transition(Phase::Executing)?;
        }
        Ok(())
    }

    async fn synthesize_phase(&self, state: &mut OrchestrationState) -> Result<(), TaskError> {
        tracing::info!(run_id = %state.run_id(), evidence = state.results().len(), "synthesizing answer");

        let answer = solver::synthesize(self.generator.as_ref(), state)
            .await
            .map_err(TaskError::SynthesisFailure)?;

        state.set_answer(answer.clone());
        state.transition(Phase::Done)?;
        self.emit(state, ProgressKind::Finished { answer });
        Ok(())
    }

    fn emit(&self, state: &OrchestrationState, kind: ProgressKind) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(ProgressEvent {
                run_id: state.run_id(),
                at: Utc::now(),
                kind,
            });
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("generator", &self.generator.name())
            .field("registry", &self.registry)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
