// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
}

/// Middleware that requires valid JWT authentication.
///
/// On success the caller's [`AuthUser`] is inserted into request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    // Missing header, non-Bearer scheme and empty token all land here.
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::MissingCredential)?;

    let auth_user = verify_jwt(bearer.token(), &state.config.jwt_signing_key)?;

    tracing::debug!(user_id = %auth_user.user_id, "Request authenticated");

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Verify a session token and return the identity it carries.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<AuthUser, AppError> {
    if token.trim().is_empty() {
        return Err(AppError::MissingCredential);
    }

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::InvalidCredential
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AppError::InvalidCredential);
    }

    Ok(AuthUser {
        user_id: token_data.claims.sub,
        username: token_data.claims.username,
    })
}

/// Create a JWT for a user session.
pub fn create_jwt(
    user_id: &str,
    username: &str,
    signing_key: &[u8],
    lifetime_secs: u64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + lifetime_secs as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
