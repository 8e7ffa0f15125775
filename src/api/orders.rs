//! Order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    CreateOrderRequest, LineItemsRequest, OrderStatus, OrderWithPositions, Payment, Priced,
    TotalPriceResponse, UpdateOrderStatusRequest,
};
use crate::services::{orders as order_service, payments as payment_service};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::metrics::record_order_placed;
use super::validation::validate_text;

/// Attach the live total to an order
pub(super) async fn with_order_total(
    state: &AppState,
    order: OrderWithPositions,
) -> Result<Priced<OrderWithPositions>, ApiError> {
    let total_price = order_service::total_price(&state.db, order.id).await?;
    Ok(Priced {
        inner: order,
        total_price,
    })
}

async fn owned_order(state: &AppState, caller: &AuthUser, id: i64) -> Result<OrderWithPositions, ApiError> {
    let order = order_service::get_order(&state.db, id).await?;
    caller.require_owner(order.user_id)?;
    Ok(order)
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Priced<OrderWithPositions>>), ApiError> {
    let user_id = caller.acting_for(req.user_id)?;

    let mut errors = ValidationErrorBuilder::new();
    errors.check("address", validate_text(&req.address, "Address", 255));
    if req.positions.is_empty() {
        errors.add("positions", "At least one position is required");
    }
    errors.finish()?;

    let order = order_service::place_order(&state.db, user_id, &req.address, &req.positions).await?;
    record_order_placed();

    Ok((StatusCode::CREATED, Json(with_order_total(&state, order).await?)))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Priced<OrderWithPositions>>, ApiError> {
    let order = owned_order(&state, &caller, id).await?;
    Ok(Json(with_order_total(&state, order).await?))
}

/// PATCH /api/orders/:id - staff may drive the whole lifecycle, the
/// customer who placed the order may only cancel it
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Priced<OrderWithPositions>>, ApiError> {
    let status = req
        .status
        .ok_or_else(|| ApiError::validation_field("status", "Status is required"))?;

    let order = order_service::get_order(&state.db, id).await?;
    if !caller.role.can_manage_catalog() {
        caller.require_owner(order.user_id)?;
        if status != OrderStatus::Cancelled {
            return Err(ApiError::forbidden("Customers may only cancel their orders"));
        }
    }

    let order = order_service::update_status(&state.db, id, status).await?;
    Ok(Json(with_order_total(&state, order).await?))
}

pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    owned_order(&state, &caller, id).await?;
    order_service::delete_order(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/orders/:id/positions
pub async fn add_order_positions(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<LineItemsRequest>,
) -> Result<Json<Priced<OrderWithPositions>>, ApiError> {
    if req.positions.is_empty() {
        return Err(ApiError::validation_field("positions", "At least one position is required"));
    }
    owned_order(&state, &caller, id).await?;

    let order = order_service::add_positions(&state.db, id, &req.positions).await?;
    Ok(Json(with_order_total(&state, order).await?))
}

/// DELETE /api/orders/:id/positions
pub async fn remove_order_positions(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<LineItemsRequest>,
) -> Result<Json<Priced<OrderWithPositions>>, ApiError> {
    owned_order(&state, &caller, id).await?;

    let order = order_service::remove_positions(&state.db, id, &req.positions).await?;
    Ok(Json(with_order_total(&state, order).await?))
}

/// GET /api/orders/:id/price
pub async fn get_order_price(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TotalPriceResponse>, ApiError> {
    owned_order(&state, &caller, id).await?;
    let total_price = order_service::total_price(&state.db, id).await?;
    Ok(Json(TotalPriceResponse { id, total_price }))
}

/// GET /api/orders/:id/payment
pub async fn get_order_payment(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    owned_order(&state, &caller, id).await?;
    let payment = payment_service::get_order_payment(&state.db, id).await?;
    Ok(Json(payment))
}
