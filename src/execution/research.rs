//! Research step - search the topic and assemble the corpus

use crate::{
    agent::{CapabilityError, SearchProvider, SearchResult},
    core::{Research, Source},
    execution::{image::ImageLocator, PipelineError},
};
use tracing::{debug, error, info};

/// Default cap on search results per run
pub const DEFAULT_MAX_RESULTS: usize = 4;

/// Runs the search and shapes its results for the writer
pub struct ResearchStep<S> {
    search: S,
    locator: ImageLocator,
    max_results: usize,
}

impl<S: SearchProvider> ResearchStep<S> {
    pub fn new(search: S, locator: ImageLocator, max_results: usize) -> Self {
        Self {
            search,
            locator,
            max_results,
        }
    }

    /// Search `topic` and build the corpus, sources and image URL
    ///
    /// Snippets and sources come from the same result list, so `snippets[i]` is backed by `sources[i]`.
    pub async fn research(&self, topic: &str) -> Result<Research, PipelineError> {
        info!("Researching: {}", topic);

        let results = self
            .search
            .search(topic, self.max_results)
            .await
            .map_err(|e| {
                error!("Search failed for {}: {}", topic, e);
                PipelineError::ResearchFailed { source: e }
            })?;

        if results.is_empty() {
            error!("Search returned no results for {}", topic);
            return Err(PipelineError::ResearchFailed {
                source: CapabilityError::EmptyResults,
            });
        }

        let research = assemble(&results, self.locator.locate(topic)?);
        debug!(
            "Research for {}: {} sources, {} bytes of corpus",
            topic,
            research.sources.len(),
            research.research_data.len()
        );
        Ok(research)
    }
}

/// Build the corpus and parallel source list from ordered search results
pub fn assemble(results: &[SearchResult], image_url: String) -> Research {
    let snippets: Vec<String> = results.iter().map(|r| r.content.clone()).collect();
    let research_data = snippets.join("\n");

    let sources = results
        .iter()
        .map(|r| Source {
            title: r.title.clone(),
            url: r.url.clone(),
        })
        .collect();

    Research {
        research_data,
        snippets,
        sources,
        image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSearch {
        results: Vec<SearchResult>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchResult>, CapabilityError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            Ok(self.results.clone())
        }
    }

    #[test]
    fn test_assemble_preserves_order() {
        let results = vec![
            SearchResult::new("A", "https://a", "s1"),
            SearchResult::new("B", "https://b", "s2"),
            SearchResult::new("C", "https://c", "s3"),
        ];
        let research = assemble(&results, "img".to_string());

        assert_eq!(research.research_data, "s1\ns2\ns3");
        assert_eq!(research.snippets, vec!["s1", "s2", "s3"]);
        assert_eq!(research.sources.len(), 3);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(research.sources[i].title, result.title);
            assert_eq!(research.sources[i].url, result.url);
        }
    }

    #[test]
    fn test_assemble_empty() {
        let research = assemble(&[], "img".to_string());
        assert_eq!(research.research_data, "");
        assert!(research.sources.is_empty());
    }

    #[tokio::test]
    async fn test_research_queries_topic_with_cap() {
        let search = FixedSearch {
            results: vec![SearchResult::new("A", "https://a", "s1")],
            calls: Mutex::new(Vec::new()),
        };
        let step = ResearchStep::new(search, ImageLocator::default(), DEFAULT_MAX_RESULTS);

        let research = step.research("tidal power").await.unwrap();

        assert_eq!(
            *step.search.calls.lock().unwrap(),
            vec![("tidal power".to_string(), 4)]
        );
        assert!(research.image_url.contains("tidal%20power"));
    }

    #[tokio::test]
    async fn test_empty_results_fail() {
        let search = FixedSearch {
            results: vec![],
            calls: Mutex::new(Vec::new()),
        };
        let step = ResearchStep::new(search, ImageLocator::default(), DEFAULT_MAX_RESULTS);

        let result = step.research("nothing").await;
        assert!(matches!(
            result,
            Err(PipelineError::ResearchFailed {
                source: CapabilityError::EmptyResults
            })
        ));
    }
}
