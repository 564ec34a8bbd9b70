//! Text generation: the collaborator behind planning, reasoning steps and
//! synthesis.

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;

pub use openai::{LlmConfig, OpenAiChat};

/// A service that answers a single text prompt with text.
///
/// Retries, if any, are the implementation's business; the orchestrator
/// treats every error as fatal for the current task.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier for logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Send `prompt` as the sole user message and return the reply text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};
