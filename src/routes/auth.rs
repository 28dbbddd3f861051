// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::services::Session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Body for both register and login. Extra fields are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Username is required and must not exceed 100 characters"
    ))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.user_id,
            username: session.username,
            token: session.token,
        }
    }
}

/// Create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    body.validate()?;

    let session = state
        .accounts
        .register(&body.username, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Start a session for an existing account.
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    body.validate()?;

    let session = state.accounts.login(&body.username, &body.password).await?;

    Ok(Json(session.into()))
}
