// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::path::PathBuf;

/// Minimum length of the HS256 signing key, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Default session token lifetime (24 hours).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 24 * 60 * 60;

/// Which document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (or its emulator).
    Firestore,
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                var: "STORAGE_BACKEND",
                reason: format!("unknown backend '{}', expected 'firestore' or 'memory'", s),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub storage_backend: StorageBackend,
    /// Directory where todo images are written and served from
    pub upload_dir: PathBuf,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Session token lifetime in seconds
    pub jwt_expiration_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SIGNING_KEY",
                reason: format!("must be at least {} bytes", MIN_SIGNING_KEY_LEN),
            });
        }

        let jwt_expiration_secs = match env::var("JWT_EXPIRATION_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "JWT_EXPIRATION_SECS",
                reason: format!("'{}' is not a number of seconds", raw),
            })?,
            Err(_) => DEFAULT_JWT_EXPIRATION_SECS,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .map(|v| v.parse())
            .unwrap_or(Ok(StorageBackend::Firestore))?;

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            jwt_signing_key,
            jwt_expiration_secs,
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            upload_dir: env::temp_dir().join("todo-service-test-uploads"),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
