//! The `Capability` trait: one named operation a plan step can invoke.
//!
//! The trait is object-safe so the registry can hold `Box<dyn Capability>`.

use anyhow::Result;
use async_trait::async_trait;

/// What a capability does, as far as the planner prompt is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Web search returning ranked hits.
    Search,
    /// Free-form text generation.
    Reasoning,
    Other,
}

/// A named operation that turns a (substituted) text input into a text
/// result.
///
/// Implementations delegate to an external collaborator. They do not retry;
/// a failed call is returned as an error and fails the task.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Name used in plan text (the `Google` in `#E1 = Google[...]`).
    fn name(&self) -> &str;

    /// One-line description shown to the planner.
    fn description(&self) -> &str;

    /// Used to pick the worked example in the planner prompt.
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Other
    }

    /// Run the capability on `input` and return its result as text.
    async fn invoke(&self, input: &str) -> Result<String>;
}

// Compile-time assertion: Capability must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Capability) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Capability for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn description(&self) -> &str {
            "Returns its input."
        }

        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.to_string())
        }
    }

    #[tokio::test]
    async fn boxed_capability_invokes() {
        let cap: Box<dyn Capability> = Box::new(Echo);
        assert_eq!(cap.name(), "Echo");
        assert_eq!(cap.kind(), CapabilityKind::Other);
        assert_eq!(cap.invoke("hello").await.unwrap(), "hello");
    }
}
