//! Wish list endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{CreateWishRequest, Wish};
use crate::services::wishes as wish_service;
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::validate_id;

/// POST /api/wishes
pub async fn create_wish(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateWishRequest>,
) -> Result<(StatusCode, Json<Wish>), ApiError> {
    let user_id = caller.acting_for(req.user_id)?;
    validate_id(req.phone_id, "phone_id").map_err(|e| ApiError::validation_field("phone_id", e))?;

    let wish = wish_service::create_wish(&state.db, user_id, req.phone_id.unwrap_or_default()).await?;
    Ok((StatusCode::CREATED, Json(wish)))
}

pub async fn delete_wish(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let wish = wish_service::get_wish(&state.db, id).await?;
    caller.require_owner(wish.user_id)?;

    wish_service::delete_wish(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
