// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (keyed by username so the insert itself enforces uniqueness)
//! - Todos (keyed by todo ID, queried by owner)

use crate::db::{collections, DocumentStore};
use crate::error::AppError;
use crate::models::{SortOrder, StatusFilter, Todo, User};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{FirestoreQueryDirection, FirestoreWritePrecondition};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Document ID for a username.
///
/// Prefixed so that names like `.` or `__x__` cannot collide with IDs
/// Firestore reserves.
fn user_doc_id(username: &str) -> String {
    format!("u_{}", urlencoding::encode(username))
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline Firestore client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        // `insert` is a create: it fails if the document already exists.
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(user_doc_id(&user.username))
            .object(user)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => Err(AppError::DuplicateUsername),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_doc_id(username))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Todo Operations ─────────────────────────────────────────

    async fn insert_todo(&self, todo: &Todo) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::TODOS)
            .document_id(&todo.id)
            .object(todo)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_todo(&self, todo_id: &str) -> Result<Option<Todo>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TODOS)
            .obj()
            .one(todo_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_todos(
        &self,
        user_id: &str,
        status: StatusFilter,
        order: SortOrder,
    ) -> Result<Vec<Todo>, AppError> {
        let user_id = user_id.to_string();
        let completed = status.completed();
        let direction = match order {
            SortOrder::Asc => FirestoreQueryDirection::Ascending,
            SortOrder::Desc => FirestoreQueryDirection::Descending,
        };

        self.get_client()?
            .fluent()
            .select()
            .from(collections::TODOS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    completed.and_then(|c| q.field("completed").eq(c)),
                ])
            })
            .order_by([("createdAt", direction.clone()), ("id", direction)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn replace_todo(&self, todo: &Todo) -> Result<(), AppError> {
        // Exists(true) keeps a stale update from resurrecting a deleted todo.
        let result: Result<Todo, FirestoreError> = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TODOS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&todo.id)
            .object(todo)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataNotFoundError(_)) => Err(AppError::NotFound),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<bool, AppError> {
        // Plain deletes of missing documents succeed silently; the
        // precondition turns that into NOT_FOUND.
        let result = self
            .get_client()?
            .fluent()
            .delete()
            .from(collections::TODOS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(todo_id)
            .execute()
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(todo_id, "Deleted todo document");
                Ok(true)
            }
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }
}
