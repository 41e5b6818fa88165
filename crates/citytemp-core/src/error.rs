//! Centralized error types for citytemp.
//!
//! This module provides a typed error hierarchy that:
//! - Carries the HTTP status each failure maps to
//! - Provides client-facing messages for response bodies
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Errors from the service crates are mapped into this type at the API edge.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Validation(_) => 422,
            AppError::Database(_) => 500,
        }
    }

    /// Message suitable for a response body.
    ///
    /// Client errors echo their detail; server errors stay generic.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::Database(e) => e.user_message().to_string(),
        }
    }
}

/// Database/storage errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::QueryFailed(_) => "A data operation failed.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}
