//! City storage error types and input validation.

use thiserror::Error;

/// Maximum city name length (matches the `city.name` column width).
pub const MAX_NAME_LENGTH: usize = 45;

/// Errors that can occur during city storage operations.
#[derive(Debug, Error)]
pub enum CityStoreError {
    /// City was not found.
    #[error("City not found: {0}")]
    NotFound(i64),

    /// A unique field (the city name) is already taken.
    #[error("City with name '{0}' already exists")]
    Conflict(String),

    /// Validation error (e.g., empty name, name too long).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error (database, task join, etc.).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CityStoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<rusqlite::Error> for CityStoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result type for city storage operations.
pub type CityStoreResult<T> = Result<T, CityStoreError>;

/// Validate a city name.
///
/// # Errors
/// Returns `CityStoreError::Validation` if:
/// - The name is empty or whitespace-only.
/// - The name exceeds `MAX_NAME_LENGTH` characters.
pub fn validate_name(name: &str) -> CityStoreResult<()> {
    if name.trim().is_empty() {
        return Err(CityStoreError::validation("City name cannot be empty"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CityStoreError::validation(format!(
            "City name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }

    Ok(())
}
