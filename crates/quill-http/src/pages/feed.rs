//! The four feed pages. All share the same fixed page size and newest-first
//! order; only the filter differs. The global feed additionally goes through
//! the injected page cache.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use quill_core::cache::CachedPage;
use quill_core::feed::{self, FeedFilter};
use quill_core::models::PostEntry;
use quill_core::pagination::Page;
use quill_ui::{FollowIndexTemplate, GroupTemplate, IndexTemplate, Pager, PostCard, ProfileTemplate};

use crate::error::{render, PageError};
use crate::extract::{CurrentUser, MaybeUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// Garbage page parameters behave like page 1, as the original does.
    fn number(&self) -> Option<i64> {
        self.page.as_deref().and_then(|raw| raw.parse().ok())
    }
}

fn cards(state: &AppState, page: &Page<PostEntry>) -> Vec<PostCard> {
    page.items
        .iter()
        .map(|entry| PostCard::from_entry(entry, |id| state.media.url(id)))
        .collect()
}

pub async fn index(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<Response, PageError> {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if let Some(hit) = state.cache.get(&key) {
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, hit.content_type)],
            hit.body,
        )
            .into_response());
    }

    let page = feed::page(state.posts.as_ref(), &FeedFilter::Global, query.number()).await?;
    let template = IndexTemplate {
        viewer: viewer.viewer(),
        posts: cards(&state, &page),
        pager: Pager::from(&page),
    };
    let html = template
        .render()
        .map_err(|err| PageError::Internal(anyhow::anyhow!("template: {err}")))?;

    state.cache.set(
        &key,
        CachedPage {
            content_type: "text/html; charset=utf-8".to_string(),
            body: html.clone().into_bytes(),
        },
        state.index_cache_ttl,
    );

    Ok(Html(html).into_response())
}

pub async fn group_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, PageError> {
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or(PageError::NotFound)?;
    let page = feed::page(state.posts.as_ref(), &FeedFilter::Group(group.id), query.number()).await?;

    render(GroupTemplate {
        viewer: viewer.viewer(),
        title: group.title,
        slug: group.slug,
        description: group.description,
        posts: cards(&state, &page),
        pager: Pager::from(&page),
    })
}

pub async fn profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, PageError> {
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(PageError::NotFound)?;

    let filter = FeedFilter::Author(author.id);
    let page = feed::page(state.posts.as_ref(), &filter, query.number()).await?;
    let post_count = state.posts.count(&filter).await?;

    let (can_follow, following) = match &viewer.0 {
        Some(user) if user.id != author.id => {
            (true, state.follows.exists(user.id, author.id).await?)
        }
        _ => (false, false),
    };

    render(ProfileTemplate {
        viewer: viewer.viewer(),
        author: author.username.clone(),
        author_display: author.display_name(),
        avatar_url: author.avatar.as_deref().map(|id| state.media.url(id)),
        post_count,
        can_follow,
        following,
        posts: cards(&state, &page),
        pager: Pager::from(&page),
    })
}

pub async fn follow_index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, PageError> {
    let page = feed::page(
        state.posts.as_ref(),
        &FeedFilter::SubscriptionsOf(user.id),
        query.number(),
    )
    .await?;

    render(FollowIndexTemplate {
        viewer: crate::extract::viewer_of(&user),
        posts: cards(&state, &page),
        pager: Pager::from(&page),
    })
}
