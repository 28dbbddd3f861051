// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use todo_service::config::Config;
use todo_service::db::{DocumentStore, FirestoreDb, MemoryDb};
use todo_service::routes::create_router;
use todo_service::AppState;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A router over a fresh in-memory store.
///
/// The temp dir holds uploaded images and must outlive the router.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub uploads: tempfile::TempDir,
}

/// Create a test app backed by the memory store.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_store(Arc::new(MemoryDb::new()))
}

/// Create a test app over a caller-supplied store.
#[allow(dead_code)]
pub fn create_test_app_with_store(db: Arc<dyn DocumentStore>) -> TestApp {
    let uploads = tempfile::tempdir().expect("temp dir");
    let mut config = Config::test_default();
    config.upload_dir = uploads.path().to_path_buf();

    let state = Arc::new(AppState::new(config, db));

    TestApp {
        router: create_router(state.clone()),
        state,
        uploads,
    }
}

/// Create a test app whose store is offline (every call fails).
#[allow(dead_code)]
pub fn create_offline_test_app() -> Router {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(FirestoreDb::new_mock()),
    ));
    create_router(state)
}

/// Send a request and return status plus parsed JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

/// Split a response into status and JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a user and return (user_id, token).
#[allow(dead_code)]
pub async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({ "username": username, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (
        body["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

/// Create a todo and return its JSON representation.
#[allow(dead_code)]
pub async fn create_todo(app: &Router, token: &str, title: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/todos",
        Some(token),
        Some(serde_json::json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

/// Assert the uniform error envelope and return its code.
#[allow(dead_code)]
pub fn error_code(body: &Value) -> &str {
    assert!(
        body["error"]["message"].is_string(),
        "missing error message: {}",
        body
    );
    body["error"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("missing error code: {}", body))
}
