// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo routes for authenticated users.

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::models::{SortOrder, StatusFilter, TodoResponse};
use crate::services::attachments::MAX_IMAGE_BYTES;
use crate::services::{NewTodo, TodoPatch};
use crate::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        DefaultBodyLimit, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Todo routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route(
            "/todos/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(
                MAX_IMAGE_BYTES + MULTIPART_OVERHEAD_BYTES,
            )),
        )
}

// ─── List ────────────────────────────────────────────────────

/// Raw list query. Unrecognised values fall back to the defaults rather
/// than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub total: usize,
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> Result<Json<TodoListResponse>> {
    let status = StatusFilter::from_query(params.status.as_deref());
    let order = SortOrder::from_query(params.sort.as_deref(), params.order.as_deref());

    tracing::debug!(
        user_id = %user.user_id,
        ?status,
        ?order,
        "Fetching todos"
    );

    let todos: Vec<TodoResponse> = state
        .todos
        .list(&user, status, order)
        .await?
        .into_iter()
        .map(TodoResponse::from)
        .collect();

    Ok(Json(TodoListResponse {
        total: todos.len(),
        todos,
    }))
}

// ─── Item Operations ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    /// Missing and empty are both rejected by the service.
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>> {
    let todo = state.todos.get(&user, &id).await?;
    Ok(Json(todo.into()))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>)> {
    let todo = state
        .todos
        .create(
            &user,
            NewTodo {
                title: body.title,
                description: body.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>> {
    let patch = TodoPatch {
        title: body.title,
        description: body.description,
        completed: body.completed,
    };

    let todo = state.todos.update(&user, &id, patch).await?;
    Ok(Json(todo.into()))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let todo = state.todos.delete(&user, &id).await?;

    // The record is gone; a leftover file is only wasted disk.
    if todo.image_url.is_some() {
        if let Err(e) = state.attachments.remove(&todo.id).await {
            tracing::warn!(todo_id = %todo.id, error = %e, "Failed to remove todo image");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

// ─── Image Attachment ────────────────────────────────────────

/// Attach an image (multipart field `image`) to a todo, replacing any
/// earlier one.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<TodoResponse>> {
    // Ownership first, so non-owners learn nothing from upload validation.
    let todo = state.todos.get(&user, &id).await?;

    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Expected multipart form: {}", e)))?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        image = Some((content_type, bytes));
        break;
    }

    let (content_type, bytes) = image
        .ok_or_else(|| AppError::Validation("Multipart field 'image' is required".to_string()))?;

    let image = state
        .attachments
        .store(&todo.id, &content_type, &bytes)
        .await?;

    // The previous image stays on disk until the record points elsewhere.
    let todo = match state.todos.set_image(&user, &todo.id, image.url.clone()).await {
        Ok(todo) => todo,
        Err(e) => {
            if let Err(cleanup) = state.attachments.discard(&image).await {
                tracing::warn!(todo_id = %todo.id, error = %cleanup, "Failed to discard unattached image");
            }
            return Err(e);
        }
    };

    if let Err(e) = state.attachments.prune(&image).await {
        tracing::warn!(todo_id = %todo.id, error = %e, "Failed to remove replaced image");
    }

    Ok(Json(todo.into()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(MAX_IMAGE_BYTES)
    } else {
        AppError::Validation(e.body_text())
    }
}
