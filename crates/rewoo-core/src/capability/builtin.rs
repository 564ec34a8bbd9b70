//! The two built-in capabilities: search and reasoning.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::trait_def::{Capability, CapabilityKind};
use crate::llm::TextGenerator;
use crate::search::SearchBackend;

/// Name the planner uses for the search capability unless overridden.
pub const DEFAULT_SEARCH_NAME: &str = "Google";
/// Name the planner uses for the reasoning capability unless overridden.
pub const DEFAULT_REASONING_NAME: &str = "LLM";

const SEARCH_DESCRIPTION: &str = "Worker that searches results from the web. Useful when you \
     need to find short and succinct answers about a specific topic. The input should be a \
     search query.";

const REASONING_DESCRIPTION: &str = "A pretrained LLM like yourself. Useful when you need to act \
     with general world knowledge and common sense. Prioritize it when you are confident in \
     solving the problem yourself. Input can be any instruction.";

/// Sends the step input as a prompt to a [`TextGenerator`].
pub struct ReasoningCapability {
    name: String,
    generator: Arc<dyn TextGenerator>,
}

impl ReasoningCapability {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::named(DEFAULT_REASONING_NAME, generator)
    }

    pub fn named(name: impl Into<String>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            name: name.into(),
            generator,
        }
    }
}

#[async_trait]
impl Capability for ReasoningCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        REASONING_DESCRIPTION
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Reasoning
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.generator
            .generate(input)
            .await
            .with_context(|| format!("text generator {} failed", self.generator.name()))
    }
}

/// Runs the step input as a query against a [`SearchBackend`] and returns
/// the hits as a JSON array of `{url, content}` objects.
pub struct SearchCapability {
    name: String,
    backend: Arc<dyn SearchBackend>,
}

impl SearchCapability {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self::named(DEFAULT_SEARCH_NAME, backend)
    }

    pub fn named(name: impl Into<String>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }
}

#[async_trait]
impl Capability for SearchCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        SEARCH_DESCRIPTION
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Search
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let hits = self
            .backend
            .search(input)
            .await
            .with_context(|| format!("search backend {} failed", self.backend.name()))?;
        serde_json::to_string(&hits).context("failed to serialize search hits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchHit;
    use anyhow::bail;

    struct Upper;

    #[async_trait]
    impl TextGenerator for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_uppercase())
        }
    }

    struct TwoHits;

    #[async_trait]
    impl SearchBackend for TwoHits {
        fn name(&self) -> &str {
            "two-hits"
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
            Ok(vec![
                SearchHit {
                    url: "https://one.example".into(),
                    content: format!("one about {query}"),
                },
                SearchHit {
                    url: "https://two.example".into(),
                    content: "two".into(),
                },
            ])
        }
    }

    struct Down;

    #[async_trait]
    impl SearchBackend for Down {
        fn name(&self) -> &str {
            "down"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn reasoning_passes_input_as_prompt() {
        let cap = ReasoningCapability::new(Arc::new(Upper));
        assert_eq!(cap.name(), DEFAULT_REASONING_NAME);
        assert_eq!(cap.kind(), CapabilityKind::Reasoning);
        assert_eq!(cap.invoke("double 5").await.unwrap(), "DOUBLE 5");
    }

    #[tokio::test]
    async fn search_serializes_hits_in_order() {
        let cap = SearchCapability::named("Search", Arc::new(TwoHits));
        assert_eq!(cap.name(), "Search");
        assert_eq!(cap.kind(), CapabilityKind::Search);

        let out = cap.invoke("rust").await.unwrap();
        let hits: Vec<SearchHit> = serde_json::from_str(&out).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "one about rust");
        assert_eq!(hits[1].url, "https://two.example");
    }

    #[tokio::test]
    async fn search_failure_names_the_backend() {
        let cap = SearchCapability::new(Arc::new(Down));
        let err = cap.invoke("q").await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("down"), "unexpected error: {msg}");
        assert!(msg.contains("connection refused"), "unexpected error: {msg}");
    }
}
