// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership-checked todo operations.
//!
//! Every item-level operation resolves the todo first and then compares its
//! owner with the caller. A malformed ID and a missing record are both
//! [`AppError::NotFound`]; a record owned by someone else is
//! [`AppError::Forbidden`] and its content is never returned.

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{SortOrder, StatusFilter, Todo};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Input for creating a todo.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Todo resource manager.
pub struct TodoService {
    db: Arc<dyn DocumentStore>,
}

impl TodoService {
    pub fn new(db: Arc<dyn DocumentStore>) -> Self {
        Self { db }
    }

    /// All of the caller's todos matching `status`, ordered by creation time.
    pub async fn list(
        &self,
        caller: &AuthUser,
        status: StatusFilter,
        order: SortOrder,
    ) -> Result<Vec<Todo>> {
        let todos = self.db.list_todos(&caller.user_id, status, order).await?;

        tracing::debug!(
            user_id = %caller.user_id,
            ?status,
            ?order,
            count = todos.len(),
            "Listed todos"
        );

        Ok(todos)
    }

    pub async fn get(&self, caller: &AuthUser, todo_id: &str) -> Result<Todo> {
        self.load_owned(caller, todo_id).await
    }

    pub async fn create(&self, caller: &AuthUser, input: NewTodo) -> Result<Todo> {
        check_title(&input.title, AppError::Unprocessable)?;

        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            user_id: caller.user_id.clone(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            completed: false,
            image_url: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.db.insert_todo(&todo).await?;

        tracing::info!(user_id = %caller.user_id, todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// Apply a partial update. `updated_at` is refreshed even when no field
    /// value actually changes.
    pub async fn update(&self, caller: &AuthUser, todo_id: &str, patch: TodoPatch) -> Result<Todo> {
        let mut todo = self.load_owned(caller, todo_id).await?;

        if let Some(title) = &patch.title {
            check_title(title, AppError::Validation)?;
        }

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = Some(Utc::now());

        self.db.replace_todo(&todo).await?;

        tracing::info!(user_id = %caller.user_id, todo_id = %todo.id, "Todo updated");
        Ok(todo)
    }

    /// Permanently delete a todo, returning the removed record.
    pub async fn delete(&self, caller: &AuthUser, todo_id: &str) -> Result<Todo> {
        let todo = self.load_owned(caller, todo_id).await?;

        // A concurrent delete by the same owner may win the race.
        if !self.db.delete_todo(&todo.id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(user_id = %caller.user_id, todo_id = %todo.id, "Todo deleted");
        Ok(todo)
    }

    /// Point the todo at a newly stored image.
    pub async fn set_image(&self, caller: &AuthUser, todo_id: &str, image_url: String) -> Result<Todo> {
        let mut todo = self.load_owned(caller, todo_id).await?;

        todo.image_url = Some(image_url);
        todo.updated_at = Some(Utc::now());
        self.db.replace_todo(&todo).await?;

        tracing::info!(user_id = %caller.user_id, todo_id = %todo.id, "Todo image set");
        Ok(todo)
    }

    /// Resolve a todo and check that the caller owns it.
    async fn load_owned(&self, caller: &AuthUser, todo_id: &str) -> Result<Todo> {
        let todo_id = parse_todo_id(todo_id)?;

        let todo = self
            .db
            .find_todo(&todo_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if todo.user_id != caller.user_id {
            tracing::warn!(
                user_id = %caller.user_id,
                todo_id = %todo.id,
                "Blocked access to another user's todo"
            );
            return Err(AppError::Forbidden);
        }

        Ok(todo)
    }
}

/// Canonical form of a todo ID, or `NotFound` if it is not a UUID.
pub fn parse_todo_id(raw: &str) -> Result<String> {
    Uuid::parse_str(raw)
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| AppError::NotFound)
}

/// Title must be non-blank and at most [`MAX_TITLE_LEN`] characters.
///
/// `too_long` picks the error flavour, since create and update report an
/// oversized title with different statuses.
fn check_title(title: &str, too_long: fn(String) -> AppError) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(too_long(format!(
            "Title must not exceed {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn caller(id: &str) -> AuthUser {
        AuthUser {
            user_id: id.to_string(),
            username: id.to_string(),
        }
    }

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryDb::new()))
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_defaults() {
        let todos = service();
        let alice = caller("alice");

        let todo = todos.create(&alice, new_todo("Buy milk")).await.unwrap();
        assert_eq!(todo.user_id, "alice");
        assert!(!todo.completed);
        assert_eq!(todo.description, "");
        assert!(todo.updated_at.is_none());

        let fetched = todos.get(&alice, &todo.id).await.unwrap();
        assert_eq!(fetched, todo);
    }

    #[tokio::test]
    async fn test_title_length_boundary() {
        let todos = service();
        let alice = caller("alice");

        todos
            .create(&alice, new_todo(&"a".repeat(MAX_TITLE_LEN)))
            .await
            .unwrap();

        let err = todos
            .create(&alice, new_todo(&"a".repeat(MAX_TITLE_LEN + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));

        // Counted in characters, not bytes.
        todos
            .create(&alice, new_todo(&"é".repeat(MAX_TITLE_LEN)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let todos = service();
        for title in ["", "   "] {
            let err = todos.create(&caller("alice"), new_todo(title)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_other_users_get_forbidden() {
        let todos = service();
        let alice = caller("alice");
        let bob = caller("bob");
        let todo = todos.create(&alice, new_todo("private")).await.unwrap();

        assert!(matches!(
            todos.get(&bob, &todo.id).await.unwrap_err(),
            AppError::Forbidden
        ));
        assert!(matches!(
            todos
                .update(
                    &bob,
                    &todo.id,
                    TodoPatch {
                        completed: Some(true),
                        ..Default::default()
                    }
                )
                .await
                .unwrap_err(),
            AppError::Forbidden
        ));
        assert!(matches!(
            todos.delete(&bob, &todo.id).await.unwrap_err(),
            AppError::Forbidden
        ));

        // Nothing changed for the owner.
        let still = todos.get(&alice, &todo.id).await.unwrap();
        assert_eq!(still, todo);
    }

    #[tokio::test]
    async fn test_malformed_and_missing_ids_are_not_found() {
        let todos = service();
        let alice = caller("alice");

        for id in ["not-an-id", "", "12345"] {
            assert!(matches!(
                todos.get(&alice, id).await.unwrap_err(),
                AppError::NotFound
            ));
        }
        assert!(matches!(
            todos
                .get(&alice, &Uuid::new_v4().to_string())
                .await
                .unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_id_lookup_accepts_uppercase_form() {
        let todos = service();
        let alice = caller("alice");
        let todo = todos.create(&alice, new_todo("x")).await.unwrap();

        let fetched = todos
            .get(&alice, &todo.id.to_uppercase())
            .await
            .unwrap();
        assert_eq!(fetched.id, todo.id);
    }

    #[tokio::test]
    async fn test_update_is_partial_and_always_touches_timestamp() {
        let todos = service();
        let alice = caller("alice");
        let todo = todos
            .create(
                &alice,
                NewTodo {
                    title: "Write report".to_string(),
                    description: Some("quarterly".to_string()),
                },
            )
            .await
            .unwrap();

        let updated = todos
            .update(
                &alice,
                &todo.id,
                TodoPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Write report");
        assert_eq!(updated.description, "quarterly");
        assert_eq!(updated.created_at, todo.created_at);
        let first_touch = updated.updated_at.expect("updated_at set");

        // No-op update still refreshes the timestamp.
        let again = todos
            .update(&alice, &todo.id, TodoPatch::default())
            .await
            .unwrap();
        assert!(again.updated_at.unwrap() >= first_touch);
        assert!(again.completed);
    }

    #[tokio::test]
    async fn test_update_validates_title() {
        let todos = service();
        let alice = caller("alice");
        let todo = todos.create(&alice, new_todo("x")).await.unwrap();

        let err = todos
            .update(
                &alice,
                &todo.id,
                TodoPatch {
                    title: Some("b".repeat(MAX_TITLE_LEN + 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let unchanged = todos.get(&alice, &todo.id).await.unwrap();
        assert_eq!(unchanged.title, "x");
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let todos = service();
        let alice = caller("alice");
        let todo = todos.create(&alice, new_todo("x")).await.unwrap();

        todos.delete(&alice, &todo.id).await.unwrap();
        assert!(matches!(
            todos.delete(&alice, &todo.id).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_only_returns_callers_todos() {
        let todos = service();
        let alice = caller("alice");
        let bob = caller("bob");
        todos.create(&alice, new_todo("a1")).await.unwrap();
        todos.create(&alice, new_todo("a2")).await.unwrap();
        todos.create(&bob, new_todo("b1")).await.unwrap();

        let listed = todos
            .list(&alice, StatusFilter::All, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|t| t.user_id == "alice"));
    }

    #[tokio::test]
    async fn test_set_image_checks_owner() {
        let todos = service();
        let alice = caller("alice");
        let todo = todos.create(&alice, new_todo("x")).await.unwrap();

        let err = todos
            .set_image(&caller("bob"), &todo.id, "/uploads/x.png".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let with_image = todos
            .set_image(&alice, &todo.id, "/uploads/x.png".to_string())
            .await
            .unwrap();
        assert_eq!(with_image.image_url.as_deref(), Some("/uploads/x.png"));
        assert!(with_image.updated_at.is_some());
    }
}
