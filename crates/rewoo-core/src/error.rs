//! Task-level errors.
//!
//! Every failure aborts the task: the caller gets either an answer or one
//! [`TaskError`] naming the stage that failed. There is no partial answer.

use std::fmt;

use thiserror::Error;

use crate::state::{Phase, ResultStoreError};

/// Errors that abort a task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("planning failed")]
    PlanningFailure(#[source] anyhow::Error),

    #[error("step {variable} names unknown capability {capability:?} (registered: {registered})")]
    UnknownCapability {
        variable: String,
        capability: String,
        registered: String,
    },

    #[error("step {variable} failed in capability {capability:?}")]
    CapabilityDispatchFailure {
        variable: String,
        capability: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("synthesis failed")]
    SynthesisFailure(#[source] anyhow::Error),

    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error(transparent)]
    DuplicateEvidence(#[from] ResultStoreError),
}

/// The kind of a [`TaskError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PlanningFailure,
    UnknownCapability,
    CapabilityDispatchFailure,
    SynthesisFailure,
    InvalidTransition,
    DuplicateEvidence,
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlanningFailure(_) => ErrorKind::PlanningFailure,
            Self::UnknownCapability { .. } => ErrorKind::UnknownCapability,
            Self::CapabilityDispatchFailure { .. } => ErrorKind::CapabilityDispatchFailure,
            Self::SynthesisFailure(_) => ErrorKind::SynthesisFailure,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::DuplicateEvidence(_) => ErrorKind::DuplicateEvidence,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PlanningFailure => "planning_failure",
            Self::UnknownCapability => "unknown_capability",
            Self::CapabilityDispatchFailure => "capability_dispatch_failure",
            Self::SynthesisFailure => "synthesis_failure",
            Self::InvalidTransition => "invalid_transition",
            Self::DuplicateEvidence => "duplicate_evidence",
        };
        f.write_str(s)
    }
}
