//! Phone catalog endpoints. Reads are public; writes need an admin or
//! seller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Comment, CreatePhoneRequest, NewPhone, Phone, PhonePage, PhoneSearch, UpdatePhoneRequest};
use crate::services::{comments as comment_service, phones as phone_service};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_optional_positive, validate_positive, validate_text};

const MAX_TEXT_LEN: usize = 100;

/// Validate a create request and turn it into an insert payload
fn validate_create_request(req: &CreatePhoneRequest) -> Result<NewPhone, ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors.check("name", validate_text(&req.name, "Name", MAX_TEXT_LEN));
    errors.check("producer_name", validate_text(&req.producer_name, "Producer name", MAX_TEXT_LEN));
    errors.check("os_name", validate_text(&req.os_name, "OS name", MAX_TEXT_LEN));
    errors.check("ram_size", validate_positive(req.ram_size, "RAM size"));
    errors.check("storage_size", validate_positive(req.storage_size, "Storage size"));
    errors.check(
        "camera_resolution",
        validate_positive(req.camera_resolution, "Camera resolution"),
    );
    errors.check("price", validate_positive(req.price, "Price"));

    errors.finish()?;

    Ok(NewPhone {
        name: req.name.clone(),
        producer_name: req.producer_name.clone(),
        os_name: req.os_name.clone(),
        ram_size: req.ram_size.unwrap_or_default(),
        storage_size: req.storage_size.unwrap_or_default(),
        camera_resolution: req.camera_resolution.unwrap_or_default(),
        price: req.price.unwrap_or_default(),
    })
}

fn validate_update_request(req: &UpdatePhoneRequest) -> Result<(), ApiError> {
    if req.is_empty() {
        return Err(ApiError::validation_field("body", "At least one field must be provided"));
    }

    let mut errors = ValidationErrorBuilder::new();

    for (field, label, value) in [
        ("name", "Name", &req.name),
        ("producer_name", "Producer name", &req.producer_name),
        ("os_name", "OS name", &req.os_name),
    ] {
        if let Some(value) = value {
            errors.check(field, validate_text(value, label, MAX_TEXT_LEN));
        }
    }

    errors.check("ram_size", validate_optional_positive(req.ram_size, "RAM size"));
    errors.check("storage_size", validate_optional_positive(req.storage_size, "Storage size"));
    errors.check(
        "camera_resolution",
        validate_optional_positive(req.camera_resolution, "Camera resolution"),
    );
    errors.check("price", validate_optional_positive(req.price, "Price"));

    errors.finish()
}

/// GET /api/phones - filtered, paginated catalog
pub async fn list_phones(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PhoneSearch>,
) -> Result<Json<PhonePage>, ApiError> {
    let page = phone_service::search_phones(&state.db, &filter, &state.config.pagination).await?;
    Ok(Json(page))
}

pub async fn get_phone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Phone>, ApiError> {
    let phone = phone_service::get_phone(&state.db, id).await?;
    Ok(Json(phone))
}

pub async fn create_phone(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(req): Json<CreatePhoneRequest>,
) -> Result<(StatusCode, Json<Phone>), ApiError> {
    caller.require_catalog_manager()?;
    let new_phone = validate_create_request(&req)?;

    let phone = phone_service::create_phone(&state.db, &new_phone).await?;
    Ok((StatusCode::CREATED, Json(phone)))
}

/// PATCH /api/phones/:id - only provided fields change
pub async fn update_phone(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePhoneRequest>,
) -> Result<Json<Phone>, ApiError> {
    caller.require_catalog_manager()?;
    validate_update_request(&req)?;

    let phone = phone_service::update_phone(&state.db, id, &req).await?;
    Ok(Json(phone))
}

pub async fn delete_phone(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    caller.require_catalog_manager()?;
    phone_service::delete_phone(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/phones/:id/comments
pub async fn list_phone_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = comment_service::list_phone_comments(&state.db, id).await?;
    Ok(Json(comments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreatePhoneRequest {
        CreatePhoneRequest {
            name: "CoolPhone v1".to_string(),
            producer_name: "CoolProducer".to_string(),
            os_name: "DOS".to_string(),
            ram_size: Some(16),
            storage_size: Some(128),
            camera_resolution: Some(20),
            price: Some(20000),
        }
    }

    #[test]
    fn test_valid_create_request() {
        let phone = validate_create_request(&create_request()).unwrap();
        assert_eq!(phone.price, 20000);
        assert_eq!(phone.name, "CoolPhone v1");
    }

    #[test]
    fn test_create_request_rejects_missing_and_non_positive() {
        let mut req = create_request();
        req.price = None;
        req.ram_size = Some(0);
        req.os_name = String::new();

        let err = validate_create_request(&req).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_update_request() {
        assert!(validate_update_request(&UpdatePhoneRequest::default()).is_err());

        let ok = UpdatePhoneRequest {
            price: Some(1),
            ..Default::default()
        };
        assert!(validate_update_request(&ok).is_ok());

        let bad = UpdatePhoneRequest {
            name: Some(" ".to_string()),
            storage_size: Some(-4),
            ..Default::default()
        };
        assert!(validate_update_request(&bad).is_err());
    }
}
