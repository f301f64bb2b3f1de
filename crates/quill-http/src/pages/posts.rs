//! Post pages: detail, create, edit, delete and the nested comment action.
//!
//! Mutations are author-only; a non-author lands back on the post, an
//! anonymous visitor on the login page (via the `CurrentUser` extractor).

use axum::extract::{Form, Multipart, Path, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use quill_core::error::AppError;
use quill_core::models::{NewComment, NewPost, PostChanges};
use quill_ui::{CommentView, GroupOption, PostCard, PostDetailTemplate, PostFormTemplate, Viewer};

use crate::error::{found, render, PageError};
use crate::extract::{viewer_of, CurrentUser, MaybeUser};
use crate::pages::forms::{self, PostFormData};
use crate::AppState;

pub async fn detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let post = state.posts.find(id).await?.ok_or(PageError::NotFound)?;
    let comments = state.comments.list_for_post(id).await?;
    let can_edit = viewer.0.as_ref().is_some_and(|user| user.id == post.author_id);

    render(PostDetailTemplate {
        viewer: viewer.viewer(),
        post: PostCard::from_entry(&post, |media_id| state.media.url(media_id)),
        comments: comments.iter().map(CommentView::from).collect(),
        can_edit,
    })
}

async fn group_options(state: &AppState, selected: Option<i64>) -> Result<Vec<GroupOption>, PageError> {
    Ok(state
        .groups
        .list()
        .await?
        .into_iter()
        .map(|group| GroupOption {
            id: group.id,
            title: group.title,
            selected: selected == Some(group.id),
        })
        .collect())
}

fn form_page(
    viewer: Option<Viewer>,
    is_edit: bool,
    post_id: i64,
    text: String,
    groups: Vec<GroupOption>,
    error: Option<String>,
) -> Result<Response, PageError> {
    render(PostFormTemplate { viewer, is_edit, post_id, text, groups, error })
        .map(IntoResponse::into_response)
}

pub async fn create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, PageError> {
    let groups = group_options(&state, None).await?;
    form_page(viewer_of(&user), false, 0, String::new(), groups, None)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let form = forms::read_post_form(&mut multipart).await?;
    match save_new_post(&state, user.id, &form).await {
        Ok(()) => Ok(found(&format!("/profile/{}/", user.username))),
        Err(Rejection::Invalid(message)) => {
            let groups = group_options(&state, form.group).await?;
            form_page(viewer_of(&user), false, 0, form.text, groups, Some(message))
        }
        Err(Rejection::Failed(err)) => Err(err),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let post = state.posts.find(id).await?.ok_or(PageError::NotFound)?;
    if post.author_id != user.id {
        return Ok(found(&format!("/posts/{id}/")));
    }
    let groups = group_options(&state, post.group.as_ref().map(|g| g.id)).await?;
    form_page(viewer_of(&user), true, id, post.text, groups, None)
}

pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Response, PageError> {
    let post = state.posts.find(id).await?.ok_or(PageError::NotFound)?;
    if post.author_id != user.id {
        return Ok(found(&format!("/posts/{id}/")));
    }

    let form = forms::read_post_form(&mut multipart).await?;
    match apply_edit(&state, id, &form).await {
        Ok(()) => Ok(found(&format!("/posts/{id}/"))),
        Err(Rejection::Invalid(message)) => {
            let groups = group_options(&state, form.group).await?;
            form_page(viewer_of(&user), true, id, form.text, groups, Some(message))
        }
        Err(Rejection::Failed(err)) => Err(err),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let post = state.posts.find(id).await?.ok_or(PageError::NotFound)?;
    if post.author_id != user.id {
        return Ok(found(&format!("/posts/{id}/")));
    }
    state.posts.delete(id).await?;
    Ok(found(&format!("/profile/{}/", user.username)))
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    text: String,
}

/// GET on the comment action has nothing to show; go back to the post.
pub async fn comment_redirect(Path(id): Path<i64>) -> Response {
    found(&format!("/posts/{id}/"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    // The parent post comes from the path; a missing one is a 404, not a
    // dangling comment.
    state.posts.find(id).await?.ok_or(PageError::NotFound)?;

    let text = form.text.trim();
    if !text.is_empty() {
        state
            .comments
            .insert(NewComment { post_id: id, author_id: user.id, text: text.to_string() })
            .await?;
    }
    Ok(found(&format!("/posts/{id}/")))
}

/// Form outcomes that re-render with a message vs. real failures.
enum Rejection {
    Invalid(String),
    Failed(PageError),
}

impl From<AppError> for Rejection {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation { message, .. } => Self::Invalid(message),
            other => Self::Failed(other.into()),
        }
    }
}

async fn save_new_post(state: &AppState, author_id: i64, form: &PostFormData) -> Result<(), Rejection> {
    let text = form.text.trim();
    if text.is_empty() {
        return Err(Rejection::Invalid("post text must not be empty".to_string()));
    }
    let image = match &form.image {
        Some(bytes) => Some(state.media.save(bytes.clone()).await?),
        None => None,
    };
    state
        .posts
        .insert(NewPost {
            author_id,
            text: text.to_string(),
            image,
            group_id: form.group,
        })
        .await?;
    Ok(())
}

async fn apply_edit(state: &AppState, id: i64, form: &PostFormData) -> Result<(), Rejection> {
    let text = form.text.trim();
    if text.is_empty() {
        return Err(Rejection::Invalid("post text must not be empty".to_string()));
    }
    let image = match &form.image {
        Some(bytes) => Some(Some(state.media.save(bytes.clone()).await?)),
        None => None,
    };
    state
        .posts
        .update(
            id,
            PostChanges {
                text: Some(text.to_string()),
                image,
                group_id: Some(form.group),
            },
        )
        .await?;
    Ok(())
}
