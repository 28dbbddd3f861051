// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login.
//!
//! Token issuance lives here; token verification is the auth middleware's job.

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::User;
use crate::services::password::{decoy_hash, hash_password, verify_password};
use std::sync::Arc;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 100;

/// A freshly authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub token: String,
}

/// Account operations on top of the document store.
pub struct AccountService {
    db: Arc<dyn DocumentStore>,
    signing_key: Vec<u8>,
    token_lifetime_secs: u64,
}

impl AccountService {
    pub fn new(db: Arc<dyn DocumentStore>, signing_key: Vec<u8>, token_lifetime_secs: u64) -> Self {
        Self {
            db,
            signing_key,
            token_lifetime_secs,
        }
    }

    /// Create a user and return a session for it.
    ///
    /// Password strength is checked before touching the store, so a weak
    /// password never creates a record.
    pub async fn register(&self, username: &str, password: &str) -> Result<Session> {
        require_credentials(username, password)?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: hash_password(password.to_string()).await?,
            created_at: chrono::Utc::now(),
        };

        // Uniqueness is enforced by the insert itself.
        self.db.insert_user(&user).await.inspect_err(|e| {
            if matches!(e, AppError::DuplicateUsername) {
                tracing::info!(username = %user.username, "Registration rejected: username taken");
            }
        })?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session_for(&user)
    }

    /// Authenticate with username and password.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        require_credentials(username, password)?;

        let user = self.db.find_user_by_username(username).await?;

        // Unknown users still pay for one Argon2 verification.
        let stored = match &user {
            Some(user) => user.password.clone(),
            None => decoy_hash().await?.to_string(),
        };
        let matches = verify_password(password.to_string(), stored).await?;

        let Some(user) = user.filter(|_| matches) else {
            tracing::info!("Login failed");
            return Err(AppError::InvalidCredentials);
        };

        tracing::info!(user_id = %user.id, "User logged in");
        self.session_for(&user)
    }

    fn session_for(&self, user: &User) -> Result<Session> {
        let token = create_jwt(
            &user.id,
            &user.username,
            &self.signing_key,
            self.token_lifetime_secs,
        )?;

        Ok(Session {
            user_id: user.id.clone(),
            username: user.username.clone(),
            token,
        })
    }
}

fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must not exceed {} characters",
            MAX_USERNAME_LEN
        )));
    }
    Ok(())
}
