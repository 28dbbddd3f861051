// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Salted password hashing (Argon2id).
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use crate::error::AppError;
use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use tokio::sync::OnceCell;

/// Hash a password into a PHC string with a fresh random salt.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("Password hashing task failed: {}", e)))?
}

/// Hash that no submitted password matches, computed once per process.
///
/// Logins for unknown usernames verify against it so they cost the same
/// Argon2 work as a wrong password.
pub async fn decoy_hash() -> Result<&'static str, AppError> {
    static DECOY: OnceCell<String> = OnceCell::const_new();
    DECOY
        .get_or_try_init(|| hash_password(uuid::Uuid::new_v4().to_string()))
        .await
        .map(String::as_str)
}

/// Check a password against a stored PHC string.
///
/// A stored value that does not parse counts as a mismatch.
pub async fn verify_password(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("Password verification task failed: {}", e)))
}
