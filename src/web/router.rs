//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{delete_file, health_check, rename_file, root, upload_file, AppState};
use super::middleware::{create_cors_layer, security_headers};
use super::openapi::ApiDoc;

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let max_size = usize::try_from(app_state.files.policy().max_size()).unwrap_or(usize::MAX);
    let body_limit = max_size.saturating_add(MULTIPART_OVERHEAD);

    let file_routes = Router::new()
        .route(
            "/upload",
            put(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/delete-file/:id", delete(delete_file))
        .route("/rename-file", post(rename_file));

    Router::new()
        .route("/", get(root))
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
