use crate::db::errors::DbError;
use crate::types::Operation;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or the token is unknown
    #[error("Not authenticated")]
    Unauthenticated,

    /// The requester does not own the resource they tried to change
    #[error("Not authorized to {operation} {resource} with ID {id}")]
    NotAuthorized {
        operation: Operation,
        resource: String,
        id: String,
    },

    /// Malformed request data
    #[error("{message}")]
    BadRequest { message: String },

    /// An entity the operation depends on does not exist
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Registration with an email that already has an account
    #[error("Email {email} is already registered")]
    AlreadyRegistered { email: String },

    /// Password does not match the stored digest
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Semantically invalid request that a handler chose to report as 422
    #[error("{message}")]
    Unprocessable { message: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// The transaction body succeeded but the commit failed
    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] DbError),

    /// Rolling back after a failed transaction body also failed
    #[error("{source}; rollback also failed: {rollback}")]
    RollbackFailed { source: Box<Error>, rollback: DbError },

    /// The transaction did not finish before its deadline and was rolled back
    #[error("Transaction did not complete within {after:?}")]
    TransactionTimeout { after: Duration },

    /// The whole request outlived `server.request_timeout` and was cancelled
    #[error("Request did not complete within {after:?}")]
    RequestTimeout { after: Duration },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_authorized(operation: Operation, resource: &str, id: impl ToString) -> Self {
        Error::NotAuthorized {
            operation,
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotAuthorized { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::AlreadyRegistered { .. } | Error::InvalidCredentials | Error::Unprocessable { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::TransactionTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            // Services turn the constraint violations they expect into domain errors, so any
            // storage fault still left here is a server fault
            Error::Database(_) | Error::Commit(_) | Error::RollbackFailed { .. } | Error::Internal { .. } | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Authentication required".to_string(),
            Error::NotAuthorized { .. }
            | Error::NotFound { .. }
            | Error::AlreadyRegistered { .. }
            | Error::InvalidCredentials
            | Error::TransactionTimeout { .. }
            | Error::RequestTimeout { .. } => self.to_string(),
            Error::BadRequest { message } | Error::Unprocessable { message } => message.clone(),
            Error::Database(_) => "Database error occurred".to_string(),
            Error::Commit(_) | Error::RollbackFailed { .. } | Error::Internal { .. } | Error::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(_)
            | Error::Commit(_)
            | Error::RollbackFailed { .. }
            | Error::Internal { .. }
            | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::TransactionTimeout { .. } => {
                tracing::warn!("Database error: {}", self);
            }
            Error::RequestTimeout { .. } => {
                tracing::warn!("Request cancelled: {}", self);
            }
            Error::Unauthenticated | Error::NotAuthorized { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. }
            | Error::NotFound { .. }
            | Error::AlreadyRegistered { .. }
            | Error::InvalidCredentials
            | Error::Unprocessable { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
