//! Error-to-response mapping for both front-ends.
//!
//! The same domain error becomes a redirect or rendered page on the web side
//! and a status code with field-keyed messages on the API side; nothing
//! propagates past the request boundary.

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use quill_core::error::AppError;
use quill_ui::NotFoundTemplate;

/// Web-page failure modes.
#[derive(Debug)]
pub enum PageError {
    /// Rendered 404 page.
    NotFound,
    /// 302 to the login page, round-tripping the origin via `?next=`.
    LoginRedirect(String),
    /// 302 somewhere else (e.g. non-author back to the post).
    Redirect(String),
    Internal(anyhow::Error),
}

impl PageError {
    pub fn login_redirect(next: &str) -> Self {
        Self::LoginRedirect(next.to_string())
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(..) => Self::NotFound,
            AppError::Unauthenticated => Self::LoginRedirect("/".to_string()),
            AppError::PermissionDenied(_) => Self::Redirect("/".to_string()),
            other => Self::Internal(anyhow::anyhow!(other)),
        }
    }
}

/// A plain 302, the status every web redirect in the public interface uses.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => not_found_page(),
            Self::LoginRedirect(next) => found(&format!("/auth/login/?next={next}")),
            Self::Redirect(to) => found(&to),
            Self::Internal(err) => {
                tracing::error!(error = %err, "page handler failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

/// The rendered 404 page, shared by the router fallback and unknown-resource
/// paths.
pub fn not_found_page() -> Response {
    match (NotFoundTemplate { viewer: None }).render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "404 template failed");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

/// Renders a template or degrades to a 500.
pub fn render<T: Template>(template: T) -> Result<Html<String>, PageError> {
    template
        .render()
        .map(Html)
        .map_err(|err| PageError::Internal(anyhow::anyhow!("template: {err}")))
}

/// JSON API failure modes, in the taxonomy the clients expect.
#[derive(Debug)]
pub enum ApiError {
    /// 404 `{"detail": "Not found."}`
    NotFound,
    /// 401 `{"detail": ...}`
    Unauthenticated(&'static str),
    /// 403 `{"detail": ...}`
    PermissionDenied,
    /// 400 `{field: [messages]}`
    Validation { field: String, messages: Vec<String> },
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), messages: vec![message.into()] }
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("Authentication credentials were not provided.")
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(..) => Self::NotFound,
            AppError::Unauthenticated => Self::Unauthenticated("Token is invalid or expired"),
            AppError::PermissionDenied(_) => Self::PermissionDenied,
            AppError::Validation { field, message } => Self::field(field, message),
            AppError::Conflict(message) => Self::field("slug", message),
            AppError::Internal(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
            }
            Self::Unauthenticated(detail) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
            }
            Self::PermissionDenied => (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "You do not have permission to perform this action." })),
            )
                .into_response(),
            Self::Validation { field, messages } => {
                (StatusCode::BAD_REQUEST, Json(json!({ field: messages }))).into_response()
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "api handler failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
