//! Comment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Comment, CreateCommentRequest, RateCommentRequest};
use crate::services::comments as comment_service;
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_id, validate_text};

const MAX_COMMENT_LEN: usize = 2000;

/// POST /api/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let user_id = caller.acting_for(req.user_id)?;

    let mut errors = ValidationErrorBuilder::new();
    errors.check("phone_id", validate_id(req.phone_id, "phone_id"));
    errors.check("text", validate_text(&req.text, "Text", MAX_COMMENT_LEN));
    errors.finish()?;

    let phone_id = req.phone_id.unwrap_or_default();
    let comment = comment_service::create_comment(&state.db, user_id, phone_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/comments/:id/rate - `liked: true` adds one, `false` takes one
pub async fn rate_comment(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let liked = req
        .liked
        .ok_or_else(|| ApiError::validation_field("liked", "liked is required"))?;

    let comment = comment_service::rate_comment(&state.db, id, liked).await?;
    Ok(Json(comment))
}

/// DELETE /api/comments/:id - author or admin
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let comment = comment_service::get_comment(&state.db, id).await?;
    caller.require_owner(comment.user_id)?;

    comment_service::delete_comment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
