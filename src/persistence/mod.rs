//! Persistence layer for saved articles and their version history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteArticleStore;

use crate::core::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Status given to drafts saved straight from a generation run
pub const DRAFT_STATUS: &str = "draft";

/// Errors from an article store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Article not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid article: {0}")]
    Invalid(String),

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// The current state of a saved article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    pub sources: Vec<Source>,
    pub angle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot taken on every save; never updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleVersion {
    pub id: Uuid,
    pub article_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A save request: update when `id` is set, insert otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveArticle {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub angle: Option<String>,
    pub status: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SaveArticle {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".to_string()));
        }
        if self.status.trim().is_empty() {
            return Err(StoreError::Invalid("status must not be empty".to_string()));
        }
        Ok(())
    }

    fn snapshot(&self, article_id: Uuid, at: DateTime<Utc>) -> ArticleVersion {
        ArticleVersion {
            id: Uuid::new_v4(),
            article_id,
            title: self.title.clone(),
            content: self.content.clone(),
            status: self.status.clone(),
            user_id: self.user_id.clone(),
            created_at: at,
        }
    }
}

/// Trait for article storage backends
#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or update an article and append a version snapshot
    async fn save_article(&self, request: &SaveArticle) -> Result<ArticleRecord, StoreError>;

    /// Load an article by ID
    async fn load_article(&self, id: Uuid) -> Result<Option<ArticleRecord>, StoreError>;

    /// List all articles, newest first
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, StoreError>;

    /// List an article's snapshots, newest first
    async fn list_versions(&self, article_id: Uuid) -> Result<Vec<ArticleVersion>, StoreError>;

    /// Delete an article and its history
    async fn delete_article(&self, id: Uuid) -> Result<(), StoreError>;
}

/// In-memory store (for testing or ephemeral use)
pub struct InMemoryArticleStore {
    articles: RwLock<Vec<ArticleRecord>>,
    versions: RwLock<Vec<ArticleVersion>>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
            versions: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first; among equal timestamps the later insert wins
fn newest_first<T, F>(items: impl DoubleEndedIterator<Item = T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut out: Vec<T> = items.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait::async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn save_article(&self, request: &SaveArticle) -> Result<ArticleRecord, StoreError> {
        request.validate()?;
        let now = Utc::now();
        let mut articles = self.articles.write().await;

        let record = match request.id {
            Some(id) => {
                let existing = articles
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(StoreError::NotFound(id))?;
                existing.title = request.title.clone();
                existing.content = request.content.clone();
                existing.status = request.status.clone();
                existing.sources = request.sources.clone();
                existing.angle = request.angle.clone();
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let record = ArticleRecord {
                    id: Uuid::new_v4(),
                    title: request.title.clone(),
                    content: request.content.clone(),
                    status: request.status.clone(),
                    sources: request.sources.clone(),
                    angle: request.angle.clone(),
                    created_at: now,
                    updated_at: now,
                };
                articles.push(record.clone());
                record
            }
        };

        self.versions
            .write()
            .await
            .push(request.snapshot(record.id, now));

        Ok(record)
    }

    async fn load_article(&self, id: Uuid) -> Result<Option<ArticleRecord>, StoreError> {
        let articles = self.articles.read().await;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        let articles = self.articles.read().await;
        Ok(newest_first(articles.iter().cloned(), |a| a.created_at))
    }

    async fn list_versions(&self, article_id: Uuid) -> Result<Vec<ArticleVersion>, StoreError> {
        let versions = self.versions.read().await;
        let matching: Vec<_> = versions
            .iter()
            .filter(|v| v.article_id == article_id)
            .cloned()
            .collect();
        Ok(newest_first(matching.into_iter(), |v| v.created_at))
    }

    async fn delete_article(&self, id: Uuid) -> Result<(), StoreError> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| a.id != id);
        if articles.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.versions.write().await.retain(|v| v.article_id != id);
        Ok(())
    }
}
