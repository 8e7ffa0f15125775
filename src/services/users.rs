//! Account management and credential checks

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::crypto::{hash_password, verify_password};
use crate::db::repository::users;
use crate::db::{DbPool, NewUser, Role, UpdateUserRequest, User, UserChanges};

/// Fields needed to open an account, password in plain text
#[derive(Debug, Clone)]
pub struct AccountDetails<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone_number: &'a str,
    pub role: Role,
}

fn hash(password: &str) -> ServiceResult<String> {
    hash_password(password)
        .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
}

async fn ensure_email_free(pool: &DbPool, email: &str, owner: Option<i64>) -> ServiceResult<()> {
    match users::get_by_email(pool, email).await? {
        Some(existing) if Some(existing.id) != owner => Err(ServiceError::bad_request(format!(
            "Email {} is already registered",
            email
        ))),
        _ => Ok(()),
    }
}

/// Create a user and their empty basket
pub async fn create_account(pool: &DbPool, details: AccountDetails<'_>) -> ServiceResult<User> {
    ensure_email_free(pool, details.email, None).await?;

    let user = users::create(
        pool,
        &NewUser {
            name: details.name.to_string(),
            email: details.email.to_string(),
            password_hash: hash(details.password)?,
            phone_number: details.phone_number.to_string(),
            role: details.role,
        },
    )
    .await?;

    info!(user_id = user.id, role = %user.role, "Created user account");
    Ok(user)
}

/// Check credentials. Unknown emails are `NotFound`, wrong passwords
/// `Unauthorized`.
pub async fn login(pool: &DbPool, email: &str, password: &str) -> ServiceResult<User> {
    let user = users::get_by_email(pool, email)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("User with email {} not found", email)))?;

    if !verify_password(password, &user.password_hash) {
        return Err(ServiceError::Unauthorized("Invalid password".to_string()));
    }

    Ok(user)
}

pub async fn get_user(pool: &DbPool, id: i64) -> ServiceResult<User> {
    users::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("User {} not found", id)))
}

/// Apply a partial profile update. A new password is re-hashed.
pub async fn update_user(pool: &DbPool, id: i64, req: &UpdateUserRequest) -> ServiceResult<User> {
    get_user(pool, id).await?;

    if let Some(email) = &req.email {
        ensure_email_free(pool, email, Some(id)).await?;
    }

    let password_hash = match &req.password {
        Some(password) => Some(hash(password)?),
        None => None,
    };

    let changes = UserChanges {
        name: req.name.clone(),
        email: req.email.clone(),
        password_hash,
        phone_number: req.phone_number.clone(),
    };

    users::update(pool, id, &changes)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("User {} not found", id)))
}

/// Delete a user; their basket, orders, comments and wishes cascade
pub async fn delete_user(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !users::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("User {} not found", id)));
    }
    info!(user_id = id, "Deleted user");
    Ok(())
}

/// Make sure the configured bootstrap admin exists
pub async fn ensure_admin_user(pool: &DbPool, email: &str, password: &str) -> ServiceResult<()> {
    if let Some(existing) = users::get_by_email(pool, email).await? {
        if !existing.role.is_admin() {
            tracing::warn!(
                "Bootstrap admin email {} belongs to a {} account, leaving it unchanged",
                email,
                existing.role
            );
        }
        return Ok(());
    }

    create_account(
        pool,
        AccountDetails {
            name: "Administrator",
            email,
            password,
            phone_number: "0000000000",
            role: Role::Admin,
        },
    )
    .await?;

    info!("Created bootstrap admin account {}", email);
    Ok(())
}
