//! Search/retrieval: the collaborator behind the search capability.

pub mod tavily;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use tavily::{SearchConfig, TavilySearch};

/// One search result, in the order the backend ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub content: String,
}

/// A retrieval backend answering a query with ranked hits.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn SearchBackend) {}
};
