//! Tavily web search client.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{SearchBackend, SearchHit};

/// Settings for [`TavilySearch`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Upper bound on hits returned per query.
    pub max_results: usize,
    pub timeout: Duration,
}

impl SearchConfig {
    pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";
    pub const DEFAULT_MAX_RESULTS: usize = 5;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &str = "TAVILY_API_KEY";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            api_key: Some(api_key.into()),
            max_results: Self::DEFAULT_MAX_RESULTS,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    url: String,
    #[serde(default)]
    content: String,
}

/// [`SearchBackend`] backed by the Tavily search API.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    client: Client,
    config: SearchConfig,
}

impl TavilySearch {
    /// Create a client. Fails if no API key is configured.
    pub fn new(config: SearchConfig) -> Result<Self> {
        if config.api_key.is_none() {
            bail!(
                "search API key not set; set {} or add it to the config file",
                SearchConfig::API_KEY_ENV
            );
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let body = json!({
            "query": query,
            "max_results": self.config.max_results,
        });

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("search request to {} failed", self.config.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("search failed with status {status}: {text}");
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .context("failed to parse search response")?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .take(self.config.max_results)
            .map(|r| SearchHit {
                url: r.url,
                content: r.content,
            })
            .collect();

        tracing::debug!(query = %query, hits = hits.len(), "search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::Value;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/search")
    }

    #[test]
    fn new_requires_api_key() {
        let mut cfg = SearchConfig::new("k");
        cfg.api_key = None;
        let err = TavilySearch::new(cfg).unwrap_err();
        assert!(err.to_string().contains(SearchConfig::API_KEY_ENV));
    }

    #[tokio::test]
    async fn search_returns_hits_in_order() {
        let router = Router::new().route(
            "/search",
            post(|Json(body): Json<Value>| async move {
                let q = body["query"].as_str().unwrap_or_default().to_string();
                Json(serde_json::json!({
                    "query": q,
                    "results": [
                        { "title": "a", "url": "https://a.example", "content": format!("first for {q}"), "score": 0.9 },
                        { "title": "b", "url": "https://b.example", "content": "second", "score": 0.5 },
                        { "title": "c", "url": "https://c.example", "content": "third", "score": 0.1 }
                    ]
                }))
            }),
        );
        let endpoint = serve(router).await;

        let search = TavilySearch::new(
            SearchConfig::new("tvly-test")
                .with_endpoint(endpoint)
                .with_max_results(2),
        )
        .unwrap();

        let hits = search.search("rust").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.example");
        assert_eq!(hits[0].content, "first for rust");
        assert_eq!(hits[1].url, "https://b.example");
    }

    #[tokio::test]
    async fn search_reports_http_errors() {
        let router = Router::new().route(
            "/search",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let endpoint = serve(router).await;

        let search =
            TavilySearch::new(SearchConfig::new("nope").with_endpoint(endpoint)).unwrap();
        let err = search.search("q").await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
