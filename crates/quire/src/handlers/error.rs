use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use quire_core::post::PostValidationError;

/// Application error type that wraps `anyhow::Error`.
///
/// This allows using `?` on functions that return `Result<_, anyhow::Error>`
/// to automatically convert them into `Result<_, AppError>`.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Application error");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// 400 response listing every validation failure of a request body.
///
/// Body shape: `{"errors": [{"field": "title", "message": "Title is required."}]}`
pub fn validation_failure(errors: &[PostValidationError]) -> Response {
    let errors: Vec<_> = errors
        .iter()
        .map(|err| {
            serde_json::json!({
                "field": err.field(),
                "message": err.to_string(),
            })
        })
        .collect();

    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "errors": errors })),
    )
        .into_response()
}
