//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/chapters` | Chapter listing in numeric order |
//! | `GET`  | `/chapters/{id}` | Every item of a chapter, resolved into blocks |
//! | `GET`  | `/chapters/{id}/items/{index}` | One item's blocks |
//! | `GET`  | `/search?q=` | Ranked results grouped by chapter |
//! | `POST` | `/admin/rebuild` | Reload the corpus and swap the index |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "chapter not found: 999" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the reader front end
//! can be served from a different origin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use khwater_core::corpus::CorpusError;

use crate::config::Config;
use crate::library::Library;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    library: Arc<Library>,
}

impl AppState {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }
}

/// Builds the API router over `library`.
pub fn router(library: Arc<Library>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/chapters", get(handle_chapters))
        .route("/chapters/{id}", get(handle_chapter))
        .route("/chapters/{id}/items/{index}", get(handle_item))
        .route("/search", get(handle_search))
        .route("/admin/rebuild", post(handle_rebuild))
        .layer(cors)
        .with_state(AppState::new(library))
}

/// Starts the HTTP server on `[server].bind`.
///
/// The corpus is loaded before binding so that a broken data path fails
/// at startup rather than on the first request. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let library = Arc::new(Library::from_config(config));
    let stats = library.snapshot().await?.stats();
    tracing::info!(
        source = %library.source_description(),
        chapters = stats.chapters,
        items = stats.items,
        "corpus ready"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(library)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: &'static str,
    message: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: message.into(),
        }
    }
}

impl From<CorpusError> for AppError {
    fn from(err: CorpusError) -> Self {
        Self::not_found(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<CorpusError>() {
            Some(corpus_err) => Self::not_found(corpus_err.to_string()),
            None => {
                let message = format!("{:#}", err);
                tracing::error!(error = %message, "request failed");
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ GET /chapters ============

async fn handle_chapters(State(state): State<AppState>) -> Result<Response, AppError> {
    let chapters = state.library.chapters().await?;
    Ok(Json(serde_json::json!({ "chapters": chapters })).into_response())
}

// ============ GET /chapters/{id} ============

async fn handle_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state.library.snapshot().await?;
    let view = snapshot.chapter_view(&id)?;
    Ok(Json(view).into_response())
}

// ============ GET /chapters/{id}/items/{index} ============

async fn handle_item(
    State(state): State<AppState>,
    Path((id, raw_index)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let index: usize = raw_index
        .parse()
        .map_err(|_| AppError::bad_request(format!("invalid item index: {}", raw_index)))?;
    let snapshot = state.library.snapshot().await?;
    let blocks = snapshot.item_blocks(&id, index)?;
    Ok(Json(serde_json::json!({
        "chapterId": id,
        "index": index,
        "blocks": blocks,
    }))
    .into_response())
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// Returns `400` when `q` is missing; an empty or blank `q` yields an
/// empty result set.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params
        .q
        .ok_or_else(|| AppError::bad_request("missing query parameter: q"))?;
    let snapshot = state.library.snapshot().await?;
    let response = snapshot.search(&query, state.library.weights());
    Ok(Json(response).into_response())
}

// ============ POST /admin/rebuild ============

async fn handle_rebuild(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.library.rebuild().await?;
    Ok(Json(serde_json::json!({ "status": "rebuilt", "stats": stats })).into_response())
}
