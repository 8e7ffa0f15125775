//! User account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    BasketWithPositions, CreateUserRequest, OrderWithPositions, Priced, UpdateUserRequest,
    UserResponse, Wish,
};
use crate::services::users::{self as user_service, AccountDetails};
use crate::services::{baskets as basket_service, orders as order_service, wishes as wish_service};
use crate::AppState;

use super::auth::AuthUser;
use super::baskets::with_basket_total;
use super::error::{ApiError, ValidationErrorBuilder};
use super::metrics::record_user_registered;
use super::orders::with_order_total;
use super::validation::{validate_email, validate_name, validate_password, validate_phone_number};

fn validate_update_request(req: &UpdateUserRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(name) = &req.name {
        errors.check("name", validate_name(name));
    }
    if let Some(email) = &req.email {
        errors.check("email", validate_email(email));
    }
    if let Some(password) = &req.password {
        errors.check("password", validate_password(password));
    }
    if let Some(phone_number) = &req.phone_number {
        errors.check("phone_number", validate_phone_number(phone_number));
    }
    if req.name.is_none() && req.email.is_none() && req.password.is_none() && req.phone_number.is_none() {
        errors.add("body", "At least one field must be provided");
    }

    errors.finish()
}

/// POST /api/users - admin-only account creation with an explicit role
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    caller.require_admin()?;

    let mut errors = ValidationErrorBuilder::new();
    errors.check("name", validate_name(&req.name));
    errors.check("email", validate_email(&req.email));
    errors.check("password", validate_password(&req.password));
    errors.check("phone_number", validate_phone_number(&req.phone_number));
    errors.finish()?;

    let user = user_service::create_account(
        &state.db,
        AccountDetails {
            name: &req.name,
            email: &req.email,
            password: &req.password,
            phone_number: &req.phone_number,
            role: req.role.unwrap_or_default(),
        },
    )
    .await?;

    record_user_registered();
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user_service::get_user(&state.db, caller.id).await?;
    Ok(Json(user.into()))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    caller.require_owner(id)?;
    let user = user_service::get_user(&state.db, id).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/users/:id - partial profile update
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    caller.require_owner(id)?;
    validate_update_request(&req)?;

    let user = user_service::update_user(&state.db, id, &req).await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    caller.require_admin()?;
    user_service::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/basket
pub async fn get_user_basket(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Priced<BasketWithPositions>>, ApiError> {
    caller.require_owner(id)?;

    let basket = basket_service::get_user_basket(&state.db, id).await?;
    Ok(Json(with_basket_total(&state, basket).await?))
}

/// GET /api/users/:id/orders
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Priced<OrderWithPositions>>>, ApiError> {
    caller.require_owner(id)?;

    let orders = order_service::list_user_orders(&state.db, id).await?;
    let mut priced = Vec::with_capacity(orders.len());
    for order in orders {
        priced.push(with_order_total(&state, order).await?);
    }
    Ok(Json(priced))
}

/// GET /api/users/:id/wishes
pub async fn list_user_wishes(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Wish>>, ApiError> {
    caller.require_owner(id)?;
    let wishes = wish_service::list_user_wishes(&state.db, id).await?;
    Ok(Json(wishes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_needs_a_field() {
        assert!(validate_update_request(&UpdateUserRequest::default()).is_err());

        let req = UpdateUserRequest {
            name: Some("Pepe".to_string()),
            ..Default::default()
        };
        assert!(validate_update_request(&req).is_ok());
    }

    #[test]
    fn test_update_request_checks_present_fields() {
        let req = UpdateUserRequest {
            email: Some("broken".to_string()),
            password: Some("abc".to_string()),
            ..Default::default()
        };
        let err = validate_update_request(&req).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
