//! The `/api/v1` JSON API. Same domain ports as the pages, DRF-style wire
//! shapes: field-keyed 400s, `detail` envelopes for 401/403/404.

pub mod comments;
pub mod follows;
pub mod groups;
pub mod jwt;
pub mod pagination;
pub mod posts;
pub mod serializers;

use axum::routing::{get, post};
use axum::Router;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jwt/create/", post(jwt::create))
        .route("/jwt/refresh/", post(jwt::refresh))
        .route("/jwt/verify/", post(jwt::verify))
        .route("/posts/", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}/",
            get(posts::retrieve)
                .put(posts::update)
                .patch(posts::partial_update)
                .delete(posts::destroy),
        )
        .route("/posts/{id}/comments/", get(comments::list).post(comments::create))
        .route(
            "/posts/{id}/comments/{comment_id}/",
            get(comments::retrieve)
                .put(comments::update)
                .patch(comments::partial_update)
                .delete(comments::destroy),
        )
        .route("/groups/", get(groups::list))
        .route("/groups/{id}/", get(groups::retrieve))
        .route("/follow/", get(follows::list).post(follows::create))
        .fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
