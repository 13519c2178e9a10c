use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use quire_core::post::{Post, PostCreateRequest, PostUpdateRequest};

use crate::{
    handlers::{error::validation_failure, AppError},
    state::AppState,
};

/// List all posts (GET /api/posts).
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state
        .post_service
        .get_posts(None)
        .await
        .ok_or_else(|| anyhow!("failed to retrieve posts"))?;

    Ok(Json(posts))
}

/// Get a post by its business id (GET /api/posts/{post_id}).
///
/// Responds with an array holding zero or one post.
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state
        .post_service
        .get_posts(Some(post_id))
        .await
        .ok_or_else(|| anyhow!("failed to retrieve post {post_id}"))?;

    Ok(Json(posts))
}

/// Create a new post (POST /api/posts).
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<PostCreateRequest>,
) -> Response {
    if let Err(errors) = payload.validate(Utc::now()) {
        return validation_failure(&errors);
    }

    match state.post_service.add_new_post(payload).await {
        Some(post) => {
            tracing::info!(post_id = %post.post_id, title = %post.title, "Created new post");
            Json(post).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Post could not be created" })),
        )
            .into_response(),
    }
}

/// Update a post by its business id (PUT /api/posts/{post_id}).
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<PostUpdateRequest>,
) -> Response {
    if let Err(errors) = payload.validate(Utc::now()) {
        return validation_failure(&errors);
    }

    match state.post_service.update_post(post_id, payload).await {
        Some(post) => {
            tracing::info!(%post_id, "Updated post");
            Json(post).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Post could not be updated" })),
        )
            .into_response(),
    }
}

/// Delete a post by its business id (DELETE /api/posts/{post_id}).
///
/// Always responds 200; failures are only logged.
pub async fn delete_post(State(state): State<AppState>, Path(post_id): Path<Uuid>) -> StatusCode {
    if state.post_service.delete_post(post_id).await {
        tracing::info!(%post_id, "Deleted post");
    } else {
        tracing::warn!(%post_id, "Post deletion failed");
    }

    StatusCode::OK
}
