//! Tavily web search client

use crate::agent::{retry::with_retry, CapabilityClientConfig, CapabilityError, SearchProvider, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Search capability backed by the Tavily `/search` API
#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    config: CapabilityClientConfig,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyClient {
    pub fn new(config: CapabilityClientConfig) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CapabilityError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn search_once(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        let body = SearchRequest {
            query,
            max_results,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api { status, body });
        }

        let text = response
            .text()
            .await
            .map_err(|e| CapabilityError::Http(e.to_string()))?;
        parse_results(&text, max_results)
    }
}

/// Decode a search response, keeping provider order
fn parse_results(text: &str, max_results: usize) -> Result<Vec<SearchResult>, CapabilityError> {
    let parsed: SearchResponse =
        serde_json::from_str(text).map_err(|e| CapabilityError::Parse(e.to_string()))?;

    Ok(parsed
        .results
        .into_iter()
        .take(max_results)
        .map(|hit| SearchResult {
            title: hit.title,
            url: hit.url,
            content: hit.content,
        })
        .collect())
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CapabilityError> {
        debug!(query, max_results, "searching");
        let policy = self.config.retry_policy();
        let results = with_retry(&policy, "search", || self.search_once(query, max_results)).await?;
        debug!(result_count = results.len(), "search returned");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_keeps_order() {
        let body = r#"{
            "query": "orbital debris",
            "results": [
                {"title": "A", "url": "https://a.example", "content": "s1", "score": 0.9},
                {"title": "B", "url": "https://b.example", "content": "s2", "score": 0.8},
                {"title": "C", "url": "https://c.example", "content": "s3", "score": 0.7}
            ]
        }"#;
        let results = parse_results(body, 4).unwrap();
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(results[2].content, "s3");
    }

    #[test]
    fn test_parse_results_caps_count() {
        let body = r#"{"results": [
            {"title": "A", "url": "https://a", "content": "1"},
            {"title": "B", "url": "https://b", "content": "2"},
            {"title": "C", "url": "https://c", "content": "3"}
        ]}"#;
        assert_eq!(parse_results(body, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_results_missing_fields_default() {
        let body = r#"{"results": [{"url": "https://a"}]}"#;
        let results = parse_results(body, 4).unwrap();
        assert_eq!(results[0].title, "");
        assert_eq!(results[0].content, "");
    }

    #[test]
    fn test_parse_results_rejects_garbage() {
        assert!(matches!(
            parse_results("<html>oops</html>", 4),
            Err(CapabilityError::Parse(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = SearchRequest {
            query: "heat pumps",
            max_results: 4,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["query"], "heat pumps");
        assert_eq!(json["max_results"], 4);
    }
}
