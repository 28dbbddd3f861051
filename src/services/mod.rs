// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod attachments;
pub mod password;
pub mod todos;

pub use accounts::{AccountService, Session};
pub use attachments::{AttachmentStore, StoredImage};
pub use todos::{NewTodo, TodoPatch, TodoService};
