//! Server-rendered routes. Trailing slashes are part of the public URL
//! space, so they are registered literally.

mod auth;
mod feed;
mod follows;
mod forms;
mod posts;

use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::error::not_found_page;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::index))
        .route("/follow/", get(feed::follow_index))
        .route("/group/{slug}/", get(feed::group_posts))
        .route("/profile/{username}/", get(feed::profile))
        .route("/profile/{username}/follow/", get(follows::profile_follow))
        .route("/profile/{username}/unfollow/", get(follows::profile_unfollow))
        .route("/create/", get(posts::create_form).post(posts::create))
        .route("/posts/{id}/", get(posts::detail))
        .route("/posts/{id}/edit/", get(posts::edit_form).post(posts::edit))
        .route("/posts/{id}/delete/", post(posts::delete))
        .route("/posts/{id}/comment/", get(posts::comment_redirect).post(posts::add_comment))
        .route("/auth/signup/", get(auth::signup_form).post(auth::signup))
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/logout/", get(auth::logout))
        .route("/auth/account/", get(auth::account))
        .route("/auth/account/update/", get(auth::account_update_form).post(auth::account_update))
}

/// Router fallback: anything unrouted is the rendered 404 page.
pub async fn not_found() -> Response {
    not_found_page()
}
