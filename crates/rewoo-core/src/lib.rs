//! Plan, act, solve.
//!
//! A task is answered in three phases: a text generator writes a plan whose
//! steps name capabilities to call, the steps run in order with earlier
//! results threaded into later inputs, and a final generator call turns the
//! plan and its evidence into an answer.
//!
//! ```text
//! task --planner prompt--> TextGenerator --plan text--> parse_plan
//!                                                          |
//!                           +------------------------------+
//!                           v
//!   Orchestrator: Planning -> Executing(k) -> Synthesizing -> Done
//!                               |   substitute(input, results)
//!                               |   CapabilityRegistry::dispatch
//!                               v
//!                          ResultStore { #E1: .., #E2: .. }
//! ```

pub mod capability;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod search;
pub mod solver;
pub mod state;
pub mod substitute;

pub use capability::{Capability, CapabilityKind, CapabilityRegistry, DispatchError};
pub use error::{ErrorKind, TaskError};
pub use llm::TextGenerator;
pub use orchestrator::{Orchestrator, ProgressEvent};
pub use plan::{Step, parse_plan};
pub use search::{SearchBackend, SearchHit};
pub use state::{OrchestrationState, Phase, ResultStore};
pub use substitute::substitute;
