//! # Authentication
//!
//! Admins log in with email and password and receive an HS256 JWT carrying
//! their email. Protected routes pass two gates:
//!
//! 1. [`require_admin`] verifies the token and loads the admin it names. The
//!    record is re-read on every request, so deleting or suspending an account
//!    locks it out immediately even while its tokens are still valid.
//! 2. [`require_manager`] additionally requires the manager role.
//!
//! The token may be sent as `Authorization: Bearer <token>` or in the
//! `x-access-token` header.
//!
//! Password hashing is CPU bound and runs on the blocking pool.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use catalog::{
    Vocabulary,
    admins::{Admin, AdminStatus},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::{error::AppError, state::AppState};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl Keys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: TimeDelta::hours(ttl_hours),
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(AppError::internal)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {e}");
                AppError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            headers
                .get(ACCESS_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The admin resolved by [`require_admin`] for this request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

async fn resolve(state: &AppState, email: &str) -> Result<Admin, AppError> {
    let admin = state
        .store
        .find_admin_by_email(email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    if admin.status != AdminStatus::Active {
        return Err(AppError::Unauthorized(format!(
            "Account is {}",
            admin.status.as_str()
        )));
    }

    Ok(admin)
}

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;
    let claims = state.keys.verify(token)?;

    let admin = resolve(&state, &claims.email).await?;
    request.extensions_mut().insert(CurrentAdmin(admin));

    Ok(next.run(request).await)
}

/// Runs inside [`require_admin`].
pub async fn require_manager(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let email = request
        .extensions()
        .get::<CurrentAdmin>()
        .map(|current| current.0.email.clone())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let admin = resolve(&state, &email).await?;
    if !admin.is_manager() {
        return Err(AppError::Forbidden(
            "Only managers can perform this action".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
