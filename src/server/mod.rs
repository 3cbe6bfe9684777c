//! HTTP API: generation, image analysis and article CRUD

pub mod error;

use crate::{
    agent::ImageAnalyzer,
    core::{config::ServerConfig, Brief, Source},
    execution::DynPipelineEngine,
    persistence::{ArticleRecord, ArticleStore, ArticleVersion, SaveArticle},
};
use anyhow::Context;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

pub use error::ApiError;

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DynPipelineEngine>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub store: Arc<dyn ArticleStore>,

    /// Deadline applied to each generation request
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub article: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub data: Vec<ArticleRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ImageAnalysisRequest {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct ImageAnalysisResponse {
    pub analysis: String,
}

/// Build the router with CORS for the configured origins
pub fn router(state: AppState, allowed_origins: &[String]) -> anyhow::Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/", get(root))
        .route("/articles", get(list_articles).post(save_article))
        .route("/articles/{id}", get(get_article))
        .route("/articles/{id}/versions", get(list_versions))
        .route("/generate", post(generate))
        .route("/analyze-image", post(analyze_image))
        .layer(cors)
        .with_state(state))
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = router(state, &config.allowed_origins)?;
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .context("bind server listener failed")?;
    info!("newsroom listening on http://{}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("server terminated with error")
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Newsroom backend is live"}))
}

async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<ArticleRecord>>, ApiError> {
    Ok(Json(state.store.list_articles().await?))
}

async fn get_article(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ArticleRecord>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .load_article(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Article not found: {}", id)))
}

async fn list_versions(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ArticleVersion>>, ApiError> {
    let Path(id) = id?;
    if state.store.load_article(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Article not found: {}", id)));
    }
    Ok(Json(state.store.list_versions(id).await?))
}

async fn save_article(
    State(state): State<AppState>,
    request: Result<Json<SaveArticle>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(request) = request?;
    let record = state.store.save_article(&request).await.map_err(|e| {
        error!("Save error: {}", e);
        ApiError::from(e)
    })?;
    info!("Saved article {} as {}", record.id, record.status);
    Ok(Json(SaveResponse {
        status: "success",
        data: vec![record],
    }))
}

async fn generate(
    State(state): State<AppState>,
    brief: Result<Json<Brief>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(brief) = brief?;
    let draft = tokio::time::timeout(state.request_timeout, state.engine.invoke(brief))
        .await
        .map_err(|_| {
            error!("Generate timed out after {:?}", state.request_timeout);
            ApiError::Timeout(state.request_timeout.as_secs())
        })?
        .map_err(|e| {
            error!("Generate error: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(GenerateResponse {
        article: draft.article,
        sources: draft.sources,
    }))
}

async fn analyze_image(
    State(state): State<AppState>,
    request: Result<Json<ImageAnalysisRequest>, JsonRejection>,
) -> Result<Json<ImageAnalysisResponse>, ApiError> {
    let Json(request) = request?;
    if request.image_url.trim().is_empty() {
        return Err(ApiError::BadRequest("image_url must not be empty".to_string()));
    }
    let analysis = state.analyzer.analyze(&request.image_url).await.map_err(|e| {
        error!("Vision error: {}", e);
        ApiError::Upstream(e.to_string())
    })?;
    Ok(Json(ImageAnalysisResponse { analysis }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{CapabilityError, SearchProvider, SearchResult, TextGenerator};
    use crate::execution::{PipelineEngine, PipelineOptions};
    use crate::persistence::InMemoryArticleStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Results(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for Results {
        async fn search(&self, _q: &str, _n: usize) -> Result<Vec<SearchResult>, CapabilityError> {
            Ok(self.0.clone())
        }
    }

    struct Writer;

    #[async_trait]
    impl TextGenerator for Writer {
        async fn generate(&self, _prompt: &str) -> Result<String, CapabilityError> {
            Ok("<h1>Tides</h1><p>Rising [1]</p>".to_string())
        }
    }

    struct Caption;

    #[async_trait]
    impl ImageAnalyzer for Caption {
        async fn analyze(&self, image_url: &str) -> Result<String, CapabilityError> {
            if image_url.contains("broken") {
                return Err(CapabilityError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok("A harbour at dusk".to_string())
        }
    }

    fn app(results: Vec<SearchResult>) -> Router {
        let search: Arc<dyn SearchProvider> = Arc::new(Results(results));
        let generator: Arc<dyn TextGenerator> = Arc::new(Writer);
        let state = AppState {
            engine: Arc::new(PipelineEngine::new(search, generator, PipelineOptions::default())),
            analyzer: Arc::new(Caption),
            store: Arc::new(InMemoryArticleStore::new()),
            request_timeout: Duration::from_secs(5),
        };
        router(state, &["http://localhost:3000".to_string()]).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn brief(topic: &str) -> Value {
        json!({
            "topic": topic,
            "angle": "coastal flooding",
            "audience": "general",
            "tone": "neutral",
            "word_count": "600"
        })
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = app(vec![]).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Newsroom backend is live"})
        );
    }

    #[tokio::test]
    async fn test_generate_returns_article_and_sources() {
        let app = app(vec![SearchResult::new("A", "https://a", "s1")]);
        let response = app
            .oneshot(post("/generate", brief("tides")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["article"], "<h1>Tides</h1><p>Rising [1]</p>");
        assert_eq!(body["sources"], json!([{"title": "A", "url": "https://a"}]));
    }

    #[tokio::test]
    async fn test_generate_empty_research_is_bad_gateway() {
        let response = app(vec![])
            .oneshot(post("/generate", brief("tides")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("Research"));
    }

    #[tokio::test]
    async fn test_generate_blank_topic_is_bad_request() {
        let response = app(vec![])
            .oneshot(post("/generate", brief("  ")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let app = app(vec![]);
        let response = app
            .clone()
            .oneshot(post(
                "/articles",
                json!({"title": "Tides", "content": "<p>x</p>", "status": "draft", "sources": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        let id = body["data"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get(&format!("/articles/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["title"], "Tides");

        let response = app
            .clone()
            .oneshot(get(&format!("/articles/{}/versions", id)))
            .await
            .unwrap();
        let versions = body_json(response).await;
        assert_eq!(versions.as_array().unwrap().len(), 1);

        let response = app.oneshot(get("/articles")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() {
        let response = app(vec![])
            .oneshot(get(&format!("/articles/{}", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_image() {
        let app = app(vec![]);
        let response = app
            .clone()
            .oneshot(post("/analyze-image", json!({"image_url": "https://img/ok.png"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["analysis"], "A harbour at dusk");

        let response = app
            .oneshot(post("/analyze-image", json!({"image_url": "https://img/broken.png"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_malformed_id_is_json_error() {
        let response = app(vec![])
            .oneshot(get("/articles/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());

        let response = app(vec![])
            .oneshot(get("/articles/not-a-uuid/versions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_incomplete_brief_is_json_error() {
        let response = app(vec![])
            .oneshot(post("/generate", json!({"topic": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("angle"), "unexpected detail: {}", detail);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/articles")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(vec![]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let search: Arc<dyn SearchProvider> = Arc::new(Results(vec![]));
        let generator: Arc<dyn TextGenerator> = Arc::new(Writer);
        let state = AppState {
            engine: Arc::new(PipelineEngine::new(search, generator, PipelineOptions::default())),
            analyzer: Arc::new(Caption),
            store: Arc::new(InMemoryArticleStore::new()),
            request_timeout: Duration::from_secs(5),
        };
        assert!(router(state, &["bad\norigin".to_string()]).is_err());
    }
}
