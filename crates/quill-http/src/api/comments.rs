//! Comment endpoints, nested under their post. The parent always comes from
//! the URL path; a comment that does not belong to the addressed post is a
//! 404, never someone else's resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use quill_core::models::{CommentEntry, NewComment, User};

use crate::api::serializers::{CommentIn, CommentOut};
use crate::error::ApiError;
use crate::extract::ApiUser;
use crate::AppState;

async fn require_post(state: &AppState, post_id: i64) -> Result<(), ApiError> {
    state.posts.find(post_id).await?.ok_or(ApiError::NotFound)?;
    Ok(())
}

async fn require_comment(
    state: &AppState,
    post_id: i64,
    comment_id: i64,
) -> Result<CommentEntry, ApiError> {
    require_post(state, post_id).await?;
    let comment = state.comments.find(comment_id).await?.ok_or(ApiError::NotFound)?;
    if comment.post_id != post_id {
        return Err(ApiError::NotFound);
    }
    Ok(comment)
}

fn require_text(input: &CommentIn) -> Result<String, ApiError> {
    input
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::field("text", "This field is required."))
}

fn ensure_author(comment: &CommentEntry, user: &User) -> Result<(), ApiError> {
    if comment.author_id != user.id {
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentOut>>, ApiError> {
    require_post(&state, post_id).await?;
    let comments = state.comments.list_for_post(post_id).await?;
    Ok(Json(comments.iter().map(CommentOut::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path(post_id): Path<i64>,
    Json(input): Json<CommentIn>,
) -> Result<Response, ApiError> {
    require_post(&state, post_id).await?;
    let text = require_text(&input)?;
    let comment = state
        .comments
        .insert(NewComment { post_id, author_id: user.id, text })
        .await?;
    Ok((StatusCode::CREATED, Json(CommentOut::from(&comment))).into_response())
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<CommentOut>, ApiError> {
    let comment = require_comment(&state, post_id, comment_id).await?;
    Ok(Json(CommentOut::from(&comment)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(input): Json<CommentIn>,
) -> Result<Json<CommentOut>, ApiError> {
    let comment = require_comment(&state, post_id, comment_id).await?;
    ensure_author(&comment, &user)?;
    let text = require_text(&input)?;
    let updated = state.comments.update_text(comment_id, &text).await?;
    Ok(Json(CommentOut::from(&updated)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(input): Json<CommentIn>,
) -> Result<Json<CommentOut>, ApiError> {
    let comment = require_comment(&state, post_id, comment_id).await?;
    ensure_author(&comment, &user)?;
    match input.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => {
            let updated = state.comments.update_text(comment_id, text).await?;
            Ok(Json(CommentOut::from(&updated)))
        }
        None => Ok(Json(CommentOut::from(&comment))),
    }
}

pub async fn destroy(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let comment = require_comment(&state, post_id, comment_id).await?;
    ensure_author(&comment, &user)?;
    state.comments.delete(comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
