//! Shared test doubles for rewoo integration tests.
//!
//! - [`ScriptedGenerator`]: replies from a queue and records every prompt.
//! - [`StaticSearch`]: canned hits per query, records every query.
//! - [`FnCapability`]: a capability backed by a closure.
//!
//! All doubles are cheap to clone; clones share their recordings so a test
//! can hand one copy to the orchestrator and inspect the other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use rewoo_core::capability::Capability;
use rewoo_core::llm::TextGenerator;
use rewoo_core::search::{SearchBackend, SearchHit};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// A [`TextGenerator`] that answers from a fixed script.
///
/// Each call pops the next scripted reply. Running out of replies is an
/// error, which makes an unexpected extra call fail the task loudly.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::default();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(Ok(reply.into()));
    }

    /// Queue a failing call.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.replies).push_back(Err(message.into()));
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        let next = lock(&self.replies).pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted generator has no reply left")),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticSearch
// ---------------------------------------------------------------------------

/// A [`SearchBackend`] with canned hits per exact query.
///
/// Unknown queries return no hits.
#[derive(Clone, Default)]
pub struct StaticSearch {
    hits: Arc<Mutex<HashMap<String, Vec<SearchHit>>>>,
    queries: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every search fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Answer `query` with one hit per `(url, content)` pair.
    pub fn with_hits(self, query: impl Into<String>, hits: &[(&str, &str)]) -> Self {
        let hits = hits
            .iter()
            .map(|(url, content)| SearchHit {
                url: (*url).to_string(),
                content: (*content).to_string(),
            })
            .collect();
        lock(&self.hits).insert(query.into(), hits);
        self
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SearchBackend for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        lock(&self.queries).push(query.to_string());
        if self.failing {
            return Err(anyhow!("search backend unavailable"));
        }
        Ok(lock(&self.hits).get(query).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// FnCapability
// ---------------------------------------------------------------------------

type Handler = dyn Fn(&str) -> Result<String> + Send + Sync;

/// A [`Capability`] whose behavior is a closure. Records every input.
#[derive(Clone)]
pub struct FnCapability {
    name: String,
    handler: Arc<Handler>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl FnCapability {
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(&str) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A capability answering each input from `table`, failing on anything
    /// else.
    pub fn table(name: impl Into<String>, table: &[(&str, &str)]) -> Self {
        let table: HashMap<String, String> = table
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self::new(name, move |input| {
            table
                .get(input)
                .cloned()
                .ok_or_else(|| anyhow!("no scripted result for input {input:?}"))
        })
    }

    /// Every input received, in order.
    pub fn inputs(&self) -> Vec<String> {
        lock(&self.inputs).clone()
    }
}

#[async_trait]
impl Capability for FnCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test capability"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        lock(&self.inputs).push(input.to_string());
        (self.handler)(input)
    }
}
