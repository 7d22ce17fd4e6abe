//! Typed errors and HTTP mapping.

use crate::config::ErrorStatus;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Raised while registering a resource. Fatal: startup should abort.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("invalid resource kind {type_name}: {reason}")]
    InvalidResourceKind { type_name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("backend: {0}")]
    Backend(String),
}

/// Request-scoped failure of a generated route. Display is the message sent to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid id '{0}'")]
    InvalidIdentity(String),
    #[error("Failed to decode json")]
    DecodeFailure(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    QueryFailure {
        message: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("{message}")]
    PersistFailure {
        message: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("Failed to delete object")]
    DeleteFailure(#[source] StoreError),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// Storage failure while listing or reading.
    pub fn query(source: StoreError) -> Self {
        ApiError::QueryFailure {
            message: "Failed to get objects",
            source,
        }
    }

    pub fn status(&self, policy: ErrorStatus) -> StatusCode {
        if let ApiError::MethodNotAllowed = self {
            return StatusCode::METHOD_NOT_ALLOWED;
        }
        match policy {
            ErrorStatus::Legacy => StatusCode::NOT_FOUND,
            ErrorStatus::Differentiated => match self {
                ApiError::InvalidIdentity(_) | ApiError::DecodeFailure(_) => StatusCode::BAD_REQUEST,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::QueryFailure { .. }
                | ApiError::PersistFailure { .. }
                | ApiError::DeleteFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            },
        }
    }

    /// Whether the failure originated in the storage backend.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ApiError::QueryFailure { .. } | ApiError::PersistFailure { .. } | ApiError::DeleteFailure(_)
        )
    }
}
