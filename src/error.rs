use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation errors")]
    Validation(Vec<FieldError>),

    #[error("Invalid JSON format")]
    MalformedBody(String),

    #[error("Invalid ID format")]
    InvalidId,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Uniqueness violation that the endpoint reports as 409.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A unique index rejected the write. `field` names the indexed field.
    #[error("Duplicate value for {field}")]
    DuplicateKey { field: String },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// Rewrite a storage-level duplicate key into the message the calling
    /// endpoint reports. Other errors pass through unchanged.
    pub fn on_duplicate(self, map: impl FnOnce(String) -> AppError) -> AppError {
        match self {
            AppError::DuplicateKey { field } => map(field),
            other => other,
        }
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_duplicate_rewrites_only_duplicates() {
        let err = AppError::DuplicateKey {
            field: "slug".into(),
        }
        .on_duplicate(|f| AppError::BadRequest(format!("taken: {f}")));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "taken: slug"));

        let err = AppError::NotFound("x".into())
            .on_duplicate(|_| AppError::BadRequest("unexpected".into()));
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
