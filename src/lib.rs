// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Todo-Service: multi-tenant todo lists behind bearer-token authentication
//!
//! This crate provides the backend API for registering users, issuing session
//! tokens, and managing per-user todo records with optional image attachments.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{AccountService, AttachmentStore, TodoService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn DocumentStore>,
    pub accounts: AccountService,
    pub todos: TodoService,
    pub attachments: AttachmentStore,
}

impl AppState {
    /// Wire the services on top of a store handle.
    pub fn new(config: Config, db: Arc<dyn DocumentStore>) -> Self {
        let accounts = AccountService::new(
            db.clone(),
            config.jwt_signing_key.clone(),
            config.jwt_expiration_secs,
        );
        let todos = TodoService::new(db.clone());
        let attachments = AttachmentStore::new(config.upload_dir.clone());

        Self {
            config,
            db,
            accounts,
            todos,
            attachments,
        }
    }
}
