//! Test doubles for the capability traits
//!
//! Each stub is cheap to clone and shares its counters, so a test can hand
//! one copy to the engine and keep another to inspect afterwards.

#![allow(dead_code)]

use async_trait::async_trait;
use newsroom::agent::{CapabilityError, SearchProvider, SearchResult, TextGenerator};
use newsroom::execution::{PipelineEngine, PipelineOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Search stub returning fixed results
#[derive(Clone)]
pub struct StubSearch {
    results: Arc<Vec<SearchResult>>,
    fail_with_status: Option<u16>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl StubSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results: Arc::new(results),
            fail_with_status: None,
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));

        if let Some(status) = self.fail_with_status {
            return Err(CapabilityError::Api {
                status,
                body: "search unavailable".to_string(),
            });
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// How the generation stub answers
#[derive(Clone)]
pub enum Reply {
    /// Return the prompt itself
    Echo,
    /// Open with the image tag the prompt asks for, then a short body
    Obedient,
    /// Fail with an upstream API error carrying this body
    Fail(String),
}

/// Generation stub recording every prompt it receives
#[derive(Clone)]
pub struct StubGenerator {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubGenerator {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

const TAG_INSTRUCTION: &str = "Start EXACTLY with this tag: ";

fn requested_tag(prompt: &str) -> Option<&str> {
    let start = prompt.find(TAG_INSTRUCTION)? + TAG_INSTRUCTION.len();
    let rest = &prompt[start..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].trim())
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.reply {
            Reply::Echo => Ok(prompt.to_string()),
            Reply::Obedient => {
                let tag = requested_tag(prompt)
                    .ok_or_else(|| CapabilityError::Parse("no image instruction".to_string()))?;
                Ok(format!("{}<h1>Headline</h1><p>A claim [1].</p>", tag))
            }
            Reply::Fail(body) => Err(CapabilityError::Api {
                status: 503,
                body: body.clone(),
            }),
        }
    }
}

/// The A/B/C results used by the end-to-end scenario
pub fn abc_results() -> Vec<SearchResult> {
    vec![
        SearchResult::new("A", "https://a.example/1", "s1"),
        SearchResult::new("B", "https://b.example/2", "s2"),
        SearchResult::new("C", "https://c.example/3", "s3"),
    ]
}

pub fn engine(
    search: &StubSearch,
    generator: &StubGenerator,
) -> PipelineEngine<StubSearch, StubGenerator> {
    PipelineEngine::new(search.clone(), generator.clone(), PipelineOptions::default())
}
