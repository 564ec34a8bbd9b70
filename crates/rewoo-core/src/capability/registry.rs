//! Capability registry -- the dispatch table from capability name to handler.
//!
//! The orchestrator looks up each step's capability here at execution time.
//! A name with no registered handler is fatal for the task.

use std::collections::HashMap;

use thiserror::Error;

use super::trait_def::{Capability, CapabilityKind};

/// Errors returned by [`CapabilityRegistry::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown capability {name:?} (registered: {registered})")]
    UnknownCapability { name: String, registered: String },

    #[error("capability {name:?} failed")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A collection of registered [`Capability`] implementations, keyed by name.
///
/// # Example
///
/// ```ignore
/// let mut registry = CapabilityRegistry::new();
/// registry.register(ReasoningCapability::new(generator.clone()));
/// let answer = registry.dispatch("LLM", "What is 2+3?").await?;
/// ```
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Box<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under the name returned by
    /// [`Capability::name`].
    ///
    /// If a capability with the same name is already registered, it is
    /// replaced and the old one is returned.
    pub fn register(&mut self, capability: impl Capability + 'static) -> Option<Box<dyn Capability>> {
        let name = capability.name().to_string();
        self.capabilities.insert(name, Box::new(capability))
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities.get(name).map(|b| b.as_ref())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.list()
            .into_iter()
            .filter_map(|name| self.get(name).map(|c| (name, c.description())))
            .collect()
    }

    /// Name of the first capability of `kind`, in name order.
    pub fn first_of_kind(&self, kind: CapabilityKind) -> Option<&str> {
        self.list()
            .into_iter()
            .find(|name| self.get(name).is_some_and(|c| c.kind() == kind))
    }

    /// Return the number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Return `true` if no capabilities are registered.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Invoke the capability called `name` with an already-substituted
    /// `input`.
    pub async fn dispatch(&self, name: &str, input: &str) -> Result<String, DispatchError> {
        let Some(capability) = self.get(name) else {
            return Err(DispatchError::UnknownCapability {
                name: name.to_string(),
                registered: self.list().join(", "),
            });
        };

        capability
            .invoke(input)
            .await
            .map_err(|source| DispatchError::Failed {
                name: name.to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.list())
            .finish()
    }
}
