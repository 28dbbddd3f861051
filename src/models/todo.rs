// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Todo model for storage and API.

use crate::time_utils::{format_utc_rfc3339, stored_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Todo record stored in the `todos` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Todo ID (UUID v4, also used as document ID)
    pub id: String,
    /// Owning user ID; fixed at creation
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Public URL of the attached image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "stored_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Absent until the first mutation
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "stored_timestamp::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which todos a list request returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    /// Parse a `status` query value. Anything but `completed` or `pending`
    /// lists everything.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("completed") => StatusFilter::Completed,
            Some("pending") => StatusFilter::Pending,
            _ => StatusFilter::All,
        }
    }

    /// Required value of the completion flag, or `None` for no constraint.
    pub fn completed(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Completed => Some(true),
            StatusFilter::Pending => Some(false),
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        self.completed().is_none_or(|c| todo.completed == c)
    }
}

/// Sort direction on creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse `sort`/`order` query values. Only `createdAt` is sortable, so
    /// ascending order needs `order=asc` with `sort` absent or `createdAt`;
    /// every other combination is newest first.
    pub fn from_query(sort: Option<&str>, order: Option<&str>) -> Self {
        match (sort, order) {
            (None | Some("createdAt"), Some("asc")) => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Todo as returned by the API. The owner ID is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            image_url: todo.image_url,
            created_at: format_utc_rfc3339(todo.created_at),
            updated_at: todo.updated_at.map(format_utc_rfc3339),
        }
    }
}
