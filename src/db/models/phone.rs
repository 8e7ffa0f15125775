//! Phone catalog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Phone {
    pub id: i64,
    pub name: String,
    pub producer_name: String,
    pub os_name: String,
    pub ram_size: i64,
    pub storage_size: i64,
    pub camera_resolution: i64,
    pub price: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhoneRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub producer_name: String,
    #[serde(default)]
    pub os_name: String,
    pub ram_size: Option<i64>,
    pub storage_size: Option<i64>,
    pub camera_resolution: Option<i64>,
    pub price: Option<i64>,
}

/// Validated insert payload
#[derive(Debug, Clone)]
pub struct NewPhone {
    pub name: String,
    pub producer_name: String,
    pub os_name: String,
    pub ram_size: i64,
    pub storage_size: i64,
    pub camera_resolution: i64,
    pub price: i64,
}

/// Partial update; only provided fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhoneRequest {
    pub name: Option<String>,
    pub producer_name: Option<String>,
    pub os_name: Option<String>,
    pub ram_size: Option<i64>,
    pub storage_size: Option<i64>,
    pub camera_resolution: Option<i64>,
    pub price: Option<i64>,
}

impl UpdatePhoneRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.producer_name.is_none()
            && self.os_name.is_none()
            && self.ram_size.is_none()
            && self.storage_size.is_none()
            && self.camera_resolution.is_none()
            && self.price.is_none()
    }
}

/// Catalog search filters, taken from the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneSearch {
    pub name: Option<String>,
    pub producer_name: Option<String>,
    pub os_name: Option<String>,
    pub min_ram_size: Option<i64>,
    pub max_ram_size: Option<i64>,
    pub min_storage_size: Option<i64>,
    pub max_storage_size: Option<i64>,
    pub min_camera_resolution: Option<i64>,
    pub max_camera_resolution: Option<i64>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhonePage {
    pub phones: Vec<Phone>,
    pub page: u32,
    pub page_size: u32,
}
