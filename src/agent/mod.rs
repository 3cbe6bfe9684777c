//! External capabilities: web search, text generation and image analysis
//!
//! The pipeline only sees the traits below. HTTP implementations live in
//! [`tavily`] and [`groq`]; tests substitute their own.

pub mod client;
pub mod groq;
pub mod response;
pub mod retry;
pub mod tavily;

use async_trait::async_trait;
use std::sync::Arc;

pub use client::CapabilityClientConfig;
pub use groq::GroqClient;
pub use response::{CapabilityError, SearchResult, TokenUsage};
pub use retry::RetryPolicy;
pub use tavily::TavilyClient;

/// Web search returning results in relevance order
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError>;
}

/// Single-turn, stateless text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError>;
}

/// Caption suggestion for an image URL
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image_url: &str) -> Result<String, CapabilityError>;
}

#[async_trait]
impl SearchProvider for Arc<dyn SearchProvider> {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        (**self).search(query, max_results).await
    }
}

#[async_trait]
impl TextGenerator for Arc<dyn TextGenerator> {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl ImageAnalyzer for Arc<dyn ImageAnalyzer> {
    async fn analyze(&self, image_url: &str) -> Result<String, CapabilityError> {
        (**self).analyze(image_url).await
    }
}
