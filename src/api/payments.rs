//! Payment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{CreatePaymentRequest, Payment, UpdatePaymentRequest};
use crate::services::{orders as order_service, payments as payment_service};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::metrics::record_payment_created;
use super::validation::validate_id;

/// Load a payment and check the caller owns its order
async fn owned_payment(state: &AppState, caller: &AuthUser, id: i64) -> Result<Payment, ApiError> {
    let payment = payment_service::get_payment(&state.db, id).await?;
    let order = order_service::get_order(&state.db, payment.order_id).await?;
    caller.require_owner(order.user_id)?;
    Ok(payment)
}

/// POST /api/payments - the sum is taken from the order at current prices
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    validate_id(req.order_id, "order_id").map_err(|e| ApiError::validation_field("order_id", e))?;
    let order_id = req.order_id.unwrap_or_default();

    let order = order_service::get_order(&state.db, order_id).await?;
    caller.require_owner(order.user_id)?;

    let payment = payment_service::create_payment(&state.db, order_id, req.status).await?;
    record_payment_created(payment.status);
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    let payment = owned_payment(&state, &caller, id).await?;
    Ok(Json(payment))
}

/// PATCH /api/payments/:id - only the paid flag can change
pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let status = req
        .status
        .ok_or_else(|| ApiError::validation_field("status", "Status is required"))?;
    owned_payment(&state, &caller, id).await?;

    let payment = payment_service::update_payment(&state.db, id, status).await?;
    Ok(Json(payment))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    owned_payment(&state, &caller, id).await?;
    payment_service::delete_payment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
