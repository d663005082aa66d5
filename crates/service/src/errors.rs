use thiserror::Error;

use models::errors::ModelError;

/// Failure taxonomy shared by every entity service, local or remote.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Unauthorized(_) => 1004,
            ServiceError::Storage(_) => 1200,
            ServiceError::Unavailable(_) => 1300,
        }
    }

    /// Short title for presentation layers that localize by code.
    pub fn title(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "Validation Error",
            ServiceError::NotFound(_) => "Not Found",
            ServiceError::Unauthorized(_) => "Unauthorized",
            ServiceError::Storage(_) | ServiceError::Unavailable(_) => "Service Unavailable",
        }
    }

    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Validation(m)
            | ServiceError::NotFound(m)
            | ServiceError::Unavailable(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Storage(m) => m,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}
