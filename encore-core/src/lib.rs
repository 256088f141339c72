pub mod validation;
pub mod repository;
pub mod search;
pub mod directory;
pub mod chat;
pub mod review;
pub mod profile_sync;
pub mod actor;

use serde::Serialize;

pub use actor::Actor;
pub use repository::{RepoResult, Repositories};
pub use validation::Validator;

/// A single failed check on an input field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
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

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid request")]
    ValidationError(Vec<FieldError>),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("Unknown action on the offer: {0}")]
    InvalidActionError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("Storage failure: {0}")]
    StorageError(String),
}

impl CoreError {
    /// Validation failure on one field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::ValidationError(vec![FieldError::new(field, message)])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFoundError(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::AuthorizationError(message.into())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        tracing::error!("Repository call failed: {}", err);
        CoreError::StorageError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
