//! newsroom - researches a topic and drafts a cited HTML article

pub mod agent;
pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod server;

// Re-export commonly used types
pub use agent::{CapabilityError, ImageAnalyzer, SearchProvider, SearchResult, TextGenerator};
pub use core::{ArticleDraft, Brief, ExecutionStatus, NewsroomConfig, Source, Stage};
pub use execution::{ExecutionEvent, PipelineEngine, PipelineError, PipelineOptions};
pub use persistence::{ArticleRecord, ArticleStore, ArticleVersion, InMemoryArticleStore, SaveArticle};
