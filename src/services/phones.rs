//! Phone catalog

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::config::PaginationConfig;
use crate::db::repository::phones;
use crate::db::{DbPool, NewPhone, Phone, PhonePage, PhoneSearch, UpdatePhoneRequest};

/// Upper bound on a phone price, keeping `quantity * price` totals within i64
pub const MAX_PRICE: i64 = 1_000_000_000;

fn ensure_positive(field: &str, value: Option<i64>) -> ServiceResult<()> {
    match value {
        Some(v) if v <= 0 => Err(ServiceError::bad_request(format!(
            "{} must be greater than 0",
            field
        ))),
        _ => Ok(()),
    }
}

fn validate_specs(
    ram_size: Option<i64>,
    storage_size: Option<i64>,
    camera_resolution: Option<i64>,
    price: Option<i64>,
) -> ServiceResult<()> {
    ensure_positive("ram_size", ram_size)?;
    ensure_positive("storage_size", storage_size)?;
    ensure_positive("camera_resolution", camera_resolution)?;
    ensure_positive("price", price)?;
    match price {
        Some(p) if p > MAX_PRICE => Err(ServiceError::bad_request(format!(
            "price cannot exceed {}",
            MAX_PRICE
        ))),
        _ => Ok(()),
    }
}

/// Resolve the requested page against configured defaults. Pages are
/// 1-based and sizes are clamped to `max_page_size`.
pub fn page_bounds(filter: &PhoneSearch, config: &PaginationConfig) -> (u32, u32) {
    let page = filter.page.unwrap_or(1).max(1);
    let page_size = filter
        .page_size
        .unwrap_or(config.default_page_size)
        .clamp(1, config.max_page_size.max(1));
    (page, page_size)
}

pub async fn get_phone(pool: &DbPool, id: i64) -> ServiceResult<Phone> {
    phones::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Phone {} not found", id)))
}

pub async fn search_phones(
    pool: &DbPool,
    filter: &PhoneSearch,
    config: &PaginationConfig,
) -> ServiceResult<PhonePage> {
    let (page, page_size) = page_bounds(filter, config);
    let phones = phones::search(pool, filter, page, page_size).await?;
    Ok(PhonePage {
        phones,
        page,
        page_size,
    })
}

pub async fn create_phone(pool: &DbPool, phone: &NewPhone) -> ServiceResult<Phone> {
    validate_specs(
        Some(phone.ram_size),
        Some(phone.storage_size),
        Some(phone.camera_resolution),
        Some(phone.price),
    )?;

    let created = phones::create(pool, phone).await?;
    info!(phone_id = created.id, "Added phone {}", created.name);
    Ok(created)
}

pub async fn update_phone(pool: &DbPool, id: i64, changes: &UpdatePhoneRequest) -> ServiceResult<Phone> {
    validate_specs(
        changes.ram_size,
        changes.storage_size,
        changes.camera_resolution,
        changes.price,
    )?;

    phones::update(pool, id, changes)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Phone {} not found", id)))
}

/// Remove a phone. Positions, comments and wishes referencing it cascade.
pub async fn delete_phone(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !phones::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("Phone {} not found", id)));
    }
    info!(phone_id = id, "Removed phone");
    Ok(())
}
