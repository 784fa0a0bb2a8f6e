//! HTTP server wiring: routes, status-code mapping, and static assets.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path as UrlPath, Query, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::annotation::{Annotation, ValidationError};
use crate::config::Config;

use super::handlers;
use super::models::StatusResponse;

/// Shared application state. The config is behind a lock so a saved
/// configuration takes effect without a restart.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    /// File the running configuration was resolved from; config saves are
    /// written back to it.
    pub config_path: Arc<PathBuf>,
}

/// Configure and start the HTTP server.
pub async fn start_http_server(config: Config, config_path: PathBuf, port: u16) -> Result<()> {
    info!("Starting HTTP server on port {}", port);

    let app_state = AppState {
        config: Arc::new(RwLock::new(config)),
        config_path: Arc::new(config_path),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/videos", get(list_videos_handler))
        .route(
            "/api/annotation/:filename",
            get(get_annotation_handler)
                .post(save_annotation_handler)
                .delete(delete_annotation_handler),
        )
        .route("/api/model-annotation/:filename", get(model_annotation_handler))
        .route("/api/video/*filename", get(video_handler))
        .route("/api/config", get(get_config_handler).post(save_config_handler))
        .route("/api/dialog", get(dialog_handler))
        .route("/", get(serve_ui))
        .route("/static/*path", get(serve_static))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Annotation UI available at http://localhost:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Filename minus its extension; the key used for all annotation lookups.
fn stem_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn error_json(error: &anyhow::Error) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": error.to_string() }))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mp4-labeler",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List videos handler
async fn list_videos_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    match handlers::list_videos(&config).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_json(&e)).into_response(),
    }
}

/// Annotation retrieval handler
async fn get_annotation_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    let annotation = handlers::get_annotation(&config, &stem_of(&filename)).await;
    Json(annotation)
}

/// Annotation save handler. Validation failures map to 400, IO failures
/// to 500.
async fn save_annotation_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
    Json(annotation): Json<Annotation>,
) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    match handlers::save_annotation(&config, &stem_of(&filename), &annotation).await {
        Ok(()) => (StatusCode::OK, Json(StatusResponse::success())).into_response(),
        Err(e) => {
            let status = if e.downcast_ref::<ValidationError>().is_some() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, error_json(&e)).into_response()
        }
    }
}

/// Annotation delete handler
async fn delete_annotation_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    match handlers::delete_annotation(&config, &stem_of(&filename)).await {
        Ok(()) => (StatusCode::OK, Json(StatusResponse::success())).into_response(),
        Err(e) => {
            let status = match e.downcast_ref::<std::io::Error>() {
                Some(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, error_json(&e)).into_response()
        }
    }
}

/// Model annotation handler (read-only)
async fn model_annotation_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    match handlers::get_model_annotation(&config, &stem_of(&filename)).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_json(&e)).into_response(),
    }
}

/// Video file handler with HTTP range support. Rejects paths that resolve
/// outside the configured video directory.
async fn video_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
    request: Request,
) -> Response {
    let config = state.config.read().await.clone();
    let requested = config.video_dir.join(&filename);

    let Ok(video_dir) = tokio::fs::canonicalize(&config.video_dir).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(video_path) = tokio::fs::canonicalize(&requested).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !video_path.starts_with(&video_dir) {
        warn!("Rejected video path outside video directory: {}", filename);
        return StatusCode::FORBIDDEN.into_response();
    }

    match ServeFile::new(&video_path).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Config retrieval handler
async fn get_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.read().await.clone();
    Json(config)
}

/// Config save handler
async fn save_config_handler(
    State(state): State<AppState>,
    Json(mut config): Json<Config>,
) -> impl IntoResponse {
    if let Err(e) = config.validate() {
        return (StatusCode::BAD_REQUEST, error_json(&e)).into_response();
    }

    match handlers::save_config(&config, &state.config_path).await {
        Ok(()) => {
            *state.config.write().await = config;
            (StatusCode::OK, Json(StatusResponse::success())).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_json(&e)).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct DialogQuery {
    mode: String,
}

/// Native dialog handler
async fn dialog_handler(Query(query): Query<DialogQuery>) -> impl IntoResponse {
    match handlers::open_dialog(&query.mode).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, error_json(&e)).into_response(),
    }
}

/// Serve the main UI page
async fn serve_ui() -> impl IntoResponse {
    match tokio::fs::read("web/index.html").await {
        Ok(content) => (StatusCode::OK, [("content-type", "text/html")], content).into_response(),
        Err(_) => {
            // Fallback info page when the bundled UI is missing.
            let html = r#"<!DOCTYPE html>
<html>
<head><title>mp4-labeler API</title></head>
<body>
    <h1>mp4-labeler</h1>
    <p>The API server is running, but the web UI was not found.</p>
    <p>Place the bundled files in the <code>web/</code> directory next to the
    binary, or use the API directly: <code>GET /api/videos</code>,
    <code>GET|POST|DELETE /api/annotation/:filename</code>,
    <code>GET|POST /api/config</code>.</p>
</body>
</html>
"#;
            (
                StatusCode::OK,
                [("content-type", "text/html")],
                html.as_bytes().to_vec(),
            )
                .into_response()
        }
    }
}

/// Serve static files from the web directory
async fn serve_static(UrlPath(path): UrlPath<String>) -> impl IntoResponse {
    let file_path = format!("web/static/{}", path);

    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = match path.rsplit('.').next() {
                Some("html") => "text/html",
                Some("css") => "text/css",
                Some("js") => "application/javascript",
                Some("json") => "application/json",
                Some("png") => "image/png",
                Some("svg") => "image/svg+xml",
                _ => "application/octet-stream",
            };

            (StatusCode::OK, [("content-type", content_type)], content).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
