//! Follow endpoints: list your own edges (with username search) and create
//! a new one. The follower is always the token's user; there is no way to
//! follow on someone else's behalf.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use quill_core::follows;

use crate::api::serializers::{FollowIn, FollowOut};
use crate::error::ApiError;
use crate::extract::ApiUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FollowOut>>, ApiError> {
    let edges = state
        .follows
        .list_for_user(user.id, query.search.as_deref())
        .await?;
    Ok(Json(edges.iter().map(FollowOut::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Json(input): Json<FollowIn>,
) -> Result<Response, ApiError> {
    let username = input
        .author
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::field("author", "This field is required."))?;

    let author = state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| ApiError::field("author", format!("author `{username}` does not exist")))?;

    let edge = follows::follow(state.follows.as_ref(), &user, &author).await?;
    Ok((StatusCode::CREATED, Json(FollowOut::from(&edge))).into_response())
}
