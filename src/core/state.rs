//! Execution state models
//!
//! A run's state is a staged record: each stage consumes the previous
//! state and returns the next one, carrying forward everything already
//! written. Fields are private and exposed read-only, so a stage can only
//! add its own fields and can never be handed a state from the wrong stage.

use crate::core::Brief;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Both stages finished
    Completed,
    /// A stage failed and the run was aborted
    Failed,
}

/// The two stages of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Research,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Citation metadata for one search result
///
/// The position in the source list is the citation number minus one:
/// `sources[0]` backs marker `[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Everything the research stage writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Research {
    /// Snippets joined with newlines, in source order
    pub research_data: String,

    /// One snippet per source; a snippet may itself span several lines
    #[serde(default)]
    pub snippets: Vec<String>,

    /// Source list parallel to `snippets`
    pub sources: Vec<Source>,

    /// Illustrative image for the article
    pub image_url: String,
}

/// Stage marker: only the brief is known
#[derive(Debug, Clone)]
pub struct Briefed;

/// Stage marker: research has been written
#[derive(Debug, Clone)]
pub struct Researched {
    research: Research,
}

/// Stage marker: the article has been written
#[derive(Debug, Clone)]
pub struct Written {
    research: Research,
    article: String,
}

/// State threaded through one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineState<S> {
    run_id: Uuid,
    brief: Brief,
    stage: S,
}

impl<S> PipelineState<S> {
    /// Unique ID of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The caller's brief, fixed for the whole run
    pub fn brief(&self) -> &Brief {
        &self.brief
    }
}

impl PipelineState<Briefed> {
    /// Start a new run from a brief
    pub fn new(brief: Brief) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            brief,
            stage: Briefed,
        }
    }

    /// Record the research stage output
    pub fn with_research(self, research: Research) -> PipelineState<Researched> {
        PipelineState {
            run_id: self.run_id,
            brief: self.brief,
            stage: Researched { research },
        }
    }
}

impl PipelineState<Researched> {
    pub fn research(&self) -> &Research {
        &self.stage.research
    }

    pub fn research_data(&self) -> &str {
        &self.stage.research.research_data
    }

    pub fn snippets(&self) -> &[String] {
        &self.stage.research.snippets
    }

    pub fn sources(&self) -> &[Source] {
        &self.stage.research.sources
    }

    pub fn image_url(&self) -> &str {
        &self.stage.research.image_url
    }

    /// Record the writer stage output
    pub fn with_article(self, article: String) -> PipelineState<Written> {
        PipelineState {
            run_id: self.run_id,
            brief: self.brief,
            stage: Written {
                research: self.stage.research,
                article,
            },
        }
    }
}

impl PipelineState<Written> {
    pub fn research(&self) -> &Research {
        &self.stage.research
    }

    pub fn sources(&self) -> &[Source] {
        &self.stage.research.sources
    }

    pub fn image_url(&self) -> &str {
        &self.stage.research.image_url
    }

    pub fn article(&self) -> &str {
        &self.stage.article
    }

    /// Hand the finished run to the caller
    pub fn into_output(self) -> ArticleDraft {
        let Written { research, article } = self.stage;
        ArticleDraft {
            run_id: self.run_id,
            article,
            sources: research.sources,
            image_url: research.image_url,
            research_data: research.research_data,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub run_id: Uuid,
    pub article: String,
    pub sources: Vec<Source>,
    pub image_url: String,
    pub research_data: String,
}

impl ArticleDraft {
    /// Text of the first `<h1>` element, if the article has one
    pub fn headline(&self) -> Option<String> {
        let start = self.article.find("<h1")?;
        let open_end = start + self.article[start..].find('>')? + 1;
        let close = open_end + self.article[open_end..].find("</h1>")?;
        let text = self.article[open_end..close].trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}
