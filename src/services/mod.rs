//! Business rules for each entity.
//!
//! Services hold no state: every call re-reads what it needs from the
//! database before writing, so concurrent writers follow last-write-wins.

pub mod baskets;
pub mod comments;
pub mod orders;
pub mod payments;
pub mod phones;
pub mod positions;
pub mod users;
pub mod wishes;

use thiserror::Error;

/// Failure taxonomy shared by all services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
pub(crate) mod testing {
    use crate::db::{DbPool, NewPhone, Phone, Role, User};

    pub fn sample_phone(name: &str, price: i64) -> NewPhone {
        NewPhone {
            name: name.to_string(),
            producer_name: "CoolProducer".to_string(),
            os_name: "DOS".to_string(),
            ram_size: 16,
            storage_size: 128,
            camera_resolution: 20,
            price,
        }
    }

    pub async fn add_phone(pool: &DbPool, name: &str, price: i64) -> Phone {
        super::phones::create_phone(pool, &sample_phone(name, price))
            .await
            .unwrap()
    }

    pub async fn add_customer(pool: &DbPool, email: &str) -> User {
        super::users::create_account(
            pool,
            super::users::AccountDetails {
                name: "Pepe",
                email,
                password: "testpswd",
                phone_number: "123123123",
                role: Role::Customer,
            },
        )
        .await
        .unwrap()
    }
}
