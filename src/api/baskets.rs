//! Basket endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    BasketWithPositions, CreateBasketRequest, LineItem, LineItemsRequest, Priced,
    RemoveFromBasketQuery, TotalPriceResponse,
};
use crate::services::baskets as basket_service;
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::parse_id_list;

/// Attach the live total to a basket
pub(super) async fn with_basket_total(
    state: &AppState,
    basket: BasketWithPositions,
) -> Result<Priced<BasketWithPositions>, ApiError> {
    let total_price = basket_service::total_price(&state.db, basket.id).await?;
    Ok(Priced {
        inner: basket,
        total_price,
    })
}

/// Turn `?phoneids=1,2&amounts=3,1` into line items. When either list is
/// absent the removal list is empty, which clears the basket.
fn parse_removal(query: &RemoveFromBasketQuery) -> Result<Vec<LineItem>, ApiError> {
    let (Some(ids), Some(amounts)) = (&query.phoneids, &query.amounts) else {
        return Ok(Vec::new());
    };

    let ids = parse_id_list(ids, "phoneids").map_err(|e| ApiError::validation_field("phoneids", e))?;
    let amounts =
        parse_id_list(amounts, "amounts").map_err(|e| ApiError::validation_field("amounts", e))?;

    if ids.len() != amounts.len() {
        return Err(ApiError::bad_request(
            "phoneids and amounts must have the same number of entries",
        ));
    }

    Ok(ids
        .into_iter()
        .zip(amounts)
        .map(|(phone_id, quantity)| LineItem::new(phone_id, quantity))
        .collect())
}

/// Load a basket and check the caller may touch it
async fn owned_basket(state: &AppState, caller: &AuthUser, id: i64) -> Result<BasketWithPositions, ApiError> {
    let basket = basket_service::get_basket(&state.db, id).await?;
    caller.require_owner(basket.user_id)?;
    Ok(basket)
}

/// POST /api/baskets
pub async fn create_basket(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateBasketRequest>,
) -> Result<(StatusCode, Json<BasketWithPositions>), ApiError> {
    let user_id = caller.acting_for(req.user_id)?;
    let basket = basket_service::create_basket(&state.db, user_id).await?;
    Ok((StatusCode::CREATED, Json(basket)))
}

pub async fn get_basket(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Priced<BasketWithPositions>>, ApiError> {
    let basket = owned_basket(&state, &caller, id).await?;
    Ok(Json(with_basket_total(&state, basket).await?))
}

/// POST /api/baskets/:id - merge positions into the basket
pub async fn add_to_basket(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<LineItemsRequest>,
) -> Result<Json<Priced<BasketWithPositions>>, ApiError> {
    if req.positions.is_empty() {
        return Err(ApiError::validation_field("positions", "At least one position is required"));
    }
    owned_basket(&state, &caller, id).await?;

    let basket = basket_service::add_products(&state.db, id, &req.positions).await?;
    Ok(Json(with_basket_total(&state, basket).await?))
}

/// DELETE /api/baskets/:id?phoneids=..&amounts=..
pub async fn remove_from_basket(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Query(query): Query<RemoveFromBasketQuery>,
) -> Result<Json<Priced<BasketWithPositions>>, ApiError> {
    let removal = parse_removal(&query)?;
    owned_basket(&state, &caller, id).await?;

    let basket = basket_service::remove_products(&state.db, id, &removal).await?;
    Ok(Json(with_basket_total(&state, basket).await?))
}

/// GET /api/baskets/:id/price
pub async fn get_basket_price(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TotalPriceResponse>, ApiError> {
    owned_basket(&state, &caller, id).await?;
    let total_price = basket_service::total_price(&state.db, id).await?;
    Ok(Json(TotalPriceResponse { id, total_price }))
}
