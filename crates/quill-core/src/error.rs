//! Centralized error handling for the Quill ecosystem.
//!
//! Every failure a request can hit maps onto one of these variants; the HTTP
//! layer turns them into redirects/rendered pages on the web side and into
//! status codes with field-keyed messages on the API side.

use thiserror::Error;

/// The primary error type for all quill-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g. group slug, username, post id).
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Bad form/serializer input, self-follow, duplicate follow.
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    /// Anonymous actor on an authenticated-only action.
    #[error("authentication required")]
    Unauthenticated,

    /// Actor is not the author of the resource being mutated.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Resource already exists (e.g. duplicate group slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (store, filesystem, template engine).
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: &'static str, key: impl ToString) -> Self {
        Self::NotFound(resource, key.to_string())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// A specialized Result type for Quill logic.
pub type Result<T> = std::result::Result<T, AppError>;
