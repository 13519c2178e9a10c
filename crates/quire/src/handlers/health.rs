//! Liveness endpoint.

use axum::http::StatusCode;

/// GET /health - Basic liveness probe.
///
/// Returns 200 immediately without touching the store or the cache.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
