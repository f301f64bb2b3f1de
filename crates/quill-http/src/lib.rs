//! # quill-http
//!
//! The web routing and orchestration layer: server-rendered pages and the
//! `/api/v1` JSON API over the same domain ports. Handlers receive the
//! authenticated actor explicitly through extractors; nothing reads ambient
//! state.

pub mod api;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod pages;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use quill_core::cache::PageCache;
use quill_core::traits::{
    Authenticator, CommentRepo, FollowRepo, GroupRepo, Mailer, MediaStore, PostRepo,
    TokenService, UserRepo,
};

/// Everything a handler needs, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub groups: Arc<dyn GroupRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub follows: Arc<dyn FollowRepo>,
    pub auth: Arc<dyn Authenticator>,
    pub tokens: Arc<dyn TokenService>,
    pub media: Arc<dyn MediaStore>,
    pub mailer: Arc<dyn Mailer>,
    pub cache: Arc<dyn PageCache>,
    /// TTL of the cached global feed page.
    pub index_cache_ttl: Duration,
}

/// Builds the full application router. `media_root` is the directory the
/// media store writes to; it is served under `/media`.
pub fn router(state: AppState, media_root: &Path) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name("quill_session")
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_secure(false);

    Router::new()
        .merge(pages::router())
        .nest("/api/v1", api::router())
        .nest_service("/media", ServeDir::new(media_root))
        .fallback(pages::not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
