// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Business code talks to [`DocumentStore`]; every method is a single-document
//! operation (or a single owner-scoped query) so correctness rests on the
//! store's per-document atomicity alone.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{SortOrder, StatusFilter, Todo, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Users, keyed by URL-encoded username
    pub const USERS: &str = "users";
    /// Todos, keyed by todo ID
    pub const TODOS: &str = "todos";
}

/// Persistence operations needed by the services.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new user. Fails with [`AppError::DuplicateUsername`] if the
    /// username is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Look up a user by exact (case-sensitive) username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new todo.
    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError>;

    /// Fetch a todo by ID regardless of owner.
    async fn find_todo(&self, todo_id: &str) -> Result<Option<Todo>, AppError>;

    /// All todos owned by `user_id` matching `status`, ordered by creation
    /// time (ties broken by ID in the same direction).
    async fn list_todos(
        &self,
        user_id: &str,
        status: StatusFilter,
        order: SortOrder,
    ) -> Result<Vec<Todo>, AppError>;

    /// Overwrite an existing todo document (last write wins). Fails with
    /// [`AppError::NotFound`] if the todo has been deleted.
    async fn replace_todo(&self, todo: &Todo) -> Result<(), AppError>;

    /// Delete a todo. Returns `false` if it did not exist.
    async fn delete_todo(&self, todo_id: &str) -> Result<bool, AppError>;
}
