//! Actor extractors. The authenticated user travels into handlers as an
//! explicit argument; the session cookie backs the pages, a bearer token
//! backs the API.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use quill_core::models::User;
use quill_ui::Viewer;

use crate::error::{ApiError, PageError};
use crate::AppState;

pub(crate) const SESSION_USER_KEY: &str = "user_id";

async fn session_user(parts: &mut Parts, state: &AppState) -> Option<User> {
    let session = tower_sessions::Session::from_request_parts(parts, state).await.ok()?;
    let id = session.get::<i64>(SESSION_USER_KEY).await.ok().flatten()?;
    state.users.find(id).await.ok().flatten()
}

fn request_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

/// The logged-in user; anonymous requests are redirected to the login page
/// with the current path as the return target.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Some(user) => Ok(Self(user)),
            None => Err(PageError::login_redirect(&request_path(parts))),
        }
    }
}

/// The logged-in user if any; pages readable by everyone use this to decide
/// what the navigation and affordances show.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await))
    }
}

impl MaybeUser {
    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(|user| Viewer { username: user.username.clone() })
    }
}

pub fn viewer_of(user: &User) -> Option<Viewer> {
    Some(Viewer { username: user.username.clone() })
}

/// Bearer-token actor for the API. Missing or invalid credentials are a 401
/// with the client-facing detail string.
pub struct ApiUser(pub User);

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::unauthenticated)?;
        let token = header.strip_prefix("Bearer ").ok_or_else(ApiError::unauthenticated)?;

        let user_id = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::Unauthenticated("Token is invalid or expired"))?;
        let user = state
            .users
            .find(user_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthenticated("User not found"))?;
        Ok(Self(user))
    }
}
