//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs signed with `auth.jwt_secret` and carry the user's
//! id and role. Every authenticated request re-reads the user so deleted
//! accounts lose access and role changes apply immediately.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::repository::users;
use crate::db::{LoginRequest, LoginResponse, RegisterRequest, Role, User, UserResponse};
use crate::services::users::{self as user_service, AccountDetails};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::metrics::record_user_registered;
use super::validation::{validate_email, validate_name, validate_password, validate_phone_number};

/// JWT payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Sign a token for `user`, valid for `auth.token_ttl_hours`
pub fn issue_token(config: &AuthConfig, user: &User) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id: user.id,
        role: user.role,
        iat: now,
        exp: now + config.token_ttl_hours * 3600,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal("Failed to issue token")
    })
}

/// Verify signature and expiry, returning the claims
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            ApiError::unauthorized("Token has expired")
        }
        _ => ApiError::unauthorized("Invalid token"),
    })
}

/// Extract the bearer token from the Authorization header
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller of an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }

    /// Admins and sellers may edit the catalog
    pub fn require_catalog_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_catalog() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin or seller role required"))
        }
    }

    /// Allow access to data owned by `owner_id`
    pub fn require_owner(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Not allowed to access another user's data"))
        }
    }

    /// Resolve an optional user id from a request body, defaulting to the
    /// caller and enforcing ownership
    pub fn acting_for(&self, user_id: Option<i64>) -> Result<i64, ApiError> {
        let user_id = user_id.unwrap_or(self.id);
        self.require_owner(user_id)?;
        Ok(user_id)
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
    let claims = decode_token(&state.config.auth, token)?;

    let user = users::get_by_id(&state.db, claims.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(AuthUser {
        id: user.id,
        role: user.role,
    })
}

/// Reject requests without a valid token; the caller is stored in the
/// request extensions for handlers
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }
        authenticate(state, &parts.headers).await
    }
}

/// POST /api/users/reg
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
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
            role: Role::Customer,
        },
    )
    .await?;

    record_user_registered();
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(&req.email));
    if req.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.finish()?;

    let user = user_service::login(&state.db, &req.email, &req.password).await?;
    let token = issue_token(&state.config.auth, &user)?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        phone_number: user.phone_number,
        role: user.role,
        token,
    }))
}
