// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{SortOrder, StatusFilter, Todo, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Memory-backed store. Clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryDb {
    /// Users keyed by username
    users: Arc<DashMap<String, User>>,
    /// Todos keyed by todo ID
    todos: Arc<DashMap<String, Todo>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDb {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateUsername),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError> {
        match self.todos.entry(todo.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(format!(
                "Todo {} already exists",
                todo.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(todo.clone());
                Ok(())
            }
        }
    }

    async fn find_todo(&self, todo_id: &str) -> Result<Option<Todo>, AppError> {
        Ok(self.todos.get(todo_id).map(|t| t.clone()))
    }

    async fn list_todos(
        &self,
        user_id: &str,
        status: StatusFilter,
        order: SortOrder,
    ) -> Result<Vec<Todo>, AppError> {
        let mut todos: Vec<Todo> = self
            .todos
            .iter()
            .filter(|t| t.user_id == user_id && status.matches(t.value()))
            .map(|t| t.value().clone())
            .collect();

        todos.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if order == SortOrder::Desc {
            todos.reverse();
        }

        Ok(todos)
    }

    async fn replace_todo(&self, todo: &Todo) -> Result<(), AppError> {
        match self.todos.get_mut(&todo.id) {
            Some(mut slot) => {
                *slot = todo.clone();
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<bool, AppError> {
        Ok(self.todos.remove(todo_id).is_some())
    }
}
