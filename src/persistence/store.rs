//! SQLite-based article store

use crate::core::Source;
use crate::persistence::{ArticleRecord, ArticleStore, ArticleVersion, SaveArticle, StoreError};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        status TEXT NOT NULL,
        sources TEXT NOT NULL DEFAULT '[]',
        angle TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS article_versions (
        id TEXT PRIMARY KEY,
        article_id TEXT NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        status TEXT NOT NULL,
        user_id TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_versions_article_id ON article_versions(article_id)",
];

const ARTICLE_COLUMNS: &str = "id, title, content, status, sources, angle, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, article_id, title, content, status, user_id, created_at";

/// SQLite article store
pub struct SqliteArticleStore {
    pool: SqlitePool,
}

impl SqliteArticleStore {
    /// Open (creating if needed) the database file at `path`
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        debug!("Opened article database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// A private in-memory database
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        // Every connection to :memory: is a separate database, so keep one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn parse_id(row: &SqliteRow, column: &str) -> Result<Uuid, StoreError> {
        let raw: String = row.try_get(column)?;
        Uuid::parse_str(&raw).map_err(|e| StoreError::Corrupt(format!("{} '{}': {}", column, raw, e)))
    }

    fn article_from_row(row: &SqliteRow) -> Result<ArticleRecord, StoreError> {
        let sources: Vec<Source> = serde_json::from_str(&row.try_get::<String, _>("sources")?)?;
        Ok(ArticleRecord {
            id: Self::parse_id(row, "id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            status: row.try_get("status")?,
            sources,
            angle: row.try_get("angle")?,
            created_at: Self::from_naive(row.try_get("created_at")?),
            updated_at: Self::from_naive(row.try_get("updated_at")?),
        })
    }

    fn version_from_row(row: &SqliteRow) -> Result<ArticleVersion, StoreError> {
        Ok(ArticleVersion {
            id: Self::parse_id(row, "id")?,
            article_id: Self::parse_id(row, "article_id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            status: row.try_get("status")?,
            user_id: row.try_get("user_id")?,
            created_at: Self::from_naive(row.try_get("created_at")?),
        })
    }
}

#[async_trait::async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn save_article(&self, request: &SaveArticle) -> Result<ArticleRecord, StoreError> {
        request.validate()?;
        let now = Utc::now();
        let sources = serde_json::to_string(&request.sources)?;
        let mut tx = self.pool.begin().await?;

        let id = match request.id {
            Some(id) => {
                let updated = sqlx::query(
                    r#"
                    UPDATE articles
                    SET title = ?1, content = ?2, status = ?3, sources = ?4, angle = ?5, updated_at = ?6
                    WHERE id = ?7
                    "#,
                )
                .bind(&request.title)
                .bind(&request.content)
                .bind(&request.status)
                .bind(&sources)
                .bind(&request.angle)
                .bind(Self::to_naive(now))
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(StoreError::NotFound(id));
                }
                id
            }
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO articles (id, title, content, status, sources, angle, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                    "#,
                )
                .bind(id.to_string())
                .bind(&request.title)
                .bind(&request.content)
                .bind(&request.status)
                .bind(&sources)
                .bind(&request.angle)
                .bind(Self::to_naive(now))
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        let version = request.snapshot(id, now);
        sqlx::query(
            r#"
            INSERT INTO article_versions (id, article_id, title, content, status, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(version.id.to_string())
        .bind(version.article_id.to_string())
        .bind(&version.title)
        .bind(&version.content)
        .bind(&version.status)
        .bind(&version.user_id)
        .bind(Self::to_naive(version.created_at))
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS))
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await?;
        let record = Self::article_from_row(&row)?;

        tx.commit().await?;
        debug!("Saved article {} ({})", record.id, record.status);
        Ok(record)
    }

    async fn load_article(&self, id: Uuid) -> Result<Option<ArticleRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::article_from_row).transpose()
    }

    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, rowid DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::article_from_row).collect()
    }

    async fn list_versions(&self, article_id: Uuid) -> Result<Vec<ArticleVersion>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM article_versions WHERE article_id = ?1 ORDER BY created_at DESC, rowid DESC",
            VERSION_COLUMNS
        ))
        .bind(article_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::version_from_row).collect()
    }

    async fn delete_article(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM article_versions WHERE article_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit().await?;
        Ok(())
    }
}
