//! Post collection endpoints.
//!
//! Reads are open to anyone; `retrieve` in particular takes no actor at all,
//! making that action read-only by construction. Mutations run through the
//! bearer extractor and an author check.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use quill_core::feed::FeedFilter;
use quill_core::models::{NewPost, PostChanges, User};

use crate::api::pagination::{envelope, LimitOffset};
use crate::api::serializers::{decode_image, PostIn, PostOut};
use crate::error::ApiError;
use crate::extract::ApiUser;
use crate::AppState;

const COLLECTION_PATH: &str = "/api/v1/posts/";

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LimitOffset>,
) -> Result<Response, ApiError> {
    let filter = FeedFilter::Global;
    let count = state.posts.count(&filter).await?;

    if params.is_active() {
        let items = state.posts.list(&filter, params.limit(), params.offset()).await?;
        let results: Vec<PostOut> = items
            .iter()
            .map(|entry| PostOut::from_entry(entry, state.media.as_ref()))
            .collect();
        Ok(Json(envelope(COLLECTION_PATH, &params, count, results)).into_response())
    } else {
        let items = state.posts.list(&filter, count.max(1), 0).await?;
        let results: Vec<PostOut> = items
            .iter()
            .map(|entry| PostOut::from_entry(entry, state.media.as_ref()))
            .collect();
        Ok(Json(results).into_response())
    }
}

pub async fn create(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Json(input): Json<PostIn>,
) -> Result<Response, ApiError> {
    let text = input
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::field("text", "This field is required."))?;

    let image = match input.image.flatten() {
        Some(raw) => Some(state.media.save(decode_image(&raw)?).await?),
        None => None,
    };

    let entry = state
        .posts
        .insert(NewPost {
            author_id: user.id,
            text: text.to_string(),
            image,
            group_id: input.group.flatten(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostOut::from_entry(&entry, state.media.as_ref())),
    )
        .into_response())
}

/// The deliberately read-only action: no actor, no permissions, just the
/// resource or a 404.
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostOut>, ApiError> {
    let entry = state.posts.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(PostOut::from_entry(&entry, state.media.as_ref())))
}

async fn apply_update(
    state: &AppState,
    user: &User,
    id: i64,
    input: PostIn,
    require_text: bool,
) -> Result<Json<PostOut>, ApiError> {
    let entry = state.posts.find(id).await?.ok_or(ApiError::NotFound)?;
    if entry.author_id != user.id {
        return Err(ApiError::PermissionDenied);
    }

    let text = match input.text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ if require_text => {
            return Err(ApiError::field("text", "This field is required."));
        }
        _ => None,
    };

    let image = match input.image {
        Some(Some(raw)) => Some(Some(state.media.save(decode_image(&raw)?).await?)),
        Some(None) => Some(None),
        None => None,
    };

    let updated = state
        .posts
        .update(id, PostChanges { text, image, group_id: input.group })
        .await?;
    Ok(Json(PostOut::from_entry(&updated, state.media.as_ref())))
}

pub async fn update(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path(id): Path<i64>,
    Json(input): Json<PostIn>,
) -> Result<Json<PostOut>, ApiError> {
    apply_update(&state, &user, id, input, true).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path(id): Path<i64>,
    Json(input): Json<PostIn>,
) -> Result<Json<PostOut>, ApiError> {
    apply_update(&state, &user, id, input, false).await
}

pub async fn destroy(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let entry = state.posts.find(id).await?.ok_or(ApiError::NotFound)?;
    if entry.author_id != user.id {
        return Err(ApiError::PermissionDenied);
    }
    state.posts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
