// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model for storage.

use crate::time_utils::stored_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user ID (UUID v4), carried in session tokens
    pub id: String,
    /// Unique, case-sensitive login name
    pub username: String,
    /// Argon2id PHC string; never leaves the server
    pub password: String,
    #[serde(with = "stored_timestamp")]
    pub created_at: DateTime<Utc>,
}
