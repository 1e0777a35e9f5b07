//! Service status handlers.

/// Banner returned by the root endpoint.
pub const BANNER: &str = "Server is up and running!";

/// GET / - Liveness banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Server banner", body = String, content_type = "text/plain")
    )
)]
pub async fn root() -> &'static str {
    BANNER
}

/// GET /health - Health check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = String, content_type = "text/plain")
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}
