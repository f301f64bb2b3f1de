//! Web follow toggles. Both actions land back on the author's profile
//! whatever the outcome; only the API surfaces follow errors to the client.

use axum::extract::{Path, State};
use axum::response::Response;

use quill_core::follows;

use crate::error::{found, PageError};
use crate::extract::CurrentUser;
use crate::AppState;

pub async fn profile_follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, PageError> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(PageError::NotFound)?;
    follows::toggle_on(state.follows.as_ref(), &user, &author).await?;
    Ok(found(&format!("/profile/{username}/")))
}

pub async fn profile_unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, PageError> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(PageError::NotFound)?;
    follows::unfollow(state.follows.as_ref(), user.id, author.id).await?;
    Ok(found(&format!("/profile/{username}/")))
}
