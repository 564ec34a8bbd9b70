//! Capability dispatch: the tools a plan step can call.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!     |
//!     v
//! CapabilityRegistry --dispatch("Google", input)--> &dyn Capability
//!     |                                                  |
//!     |   unknown name -> DispatchError::UnknownCapability
//!     |                                                  v
//!     |                                     invoke(input) -> String
//! ```

pub mod builtin;
pub mod registry;
pub mod trait_def;

pub use builtin::{
    DEFAULT_REASONING_NAME, DEFAULT_SEARCH_NAME, ReasoningCapability, SearchCapability,
};
pub use registry::{CapabilityRegistry, DispatchError};
pub use trait_def::{Capability, CapabilityKind};
