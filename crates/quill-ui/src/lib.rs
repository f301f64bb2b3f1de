//! Askama templates and the view models the pages render.
//!
//! Handlers map domain read models into these flat structs (dates already
//! formatted, media ids already resolved to URLs) so the templates stay free
//! of domain logic.

use askama::Template;
use chrono::{DateTime, Utc};

use quill_core::models::{CommentEntry, PostEntry};
use quill_core::pagination::Page;

/// The authenticated actor, as the navigation bar needs it.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

/// One post as rendered inside any feed or on its detail page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: String,
    pub image_url: Option<String>,
    pub group: Option<GroupLink>,
}

impl PostCard {
    /// `resolve` turns a stored media id into a public URL.
    pub fn from_entry(entry: &PostEntry, resolve: impl Fn(&str) -> String) -> Self {
        Self {
            id: entry.id,
            author: entry.author_username.clone(),
            text: entry.text.clone(),
            created: format_date(&entry.created_at),
            image_url: entry.image.as_deref().map(resolve),
            group: entry.group.as_ref().map(|g| GroupLink {
                title: g.title.clone(),
                slug: g.slug.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<&CommentEntry> for CommentView {
    fn from(entry: &CommentEntry) -> Self {
        Self {
            author: entry.author_username.clone(),
            text: entry.text.clone(),
            created: format_date(&entry.created_at),
        }
    }
}

/// Pager widget state, derived from a core [`Page`].
#[derive(Debug, Clone)]
pub struct Pager {
    pub number: i64,
    pub pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: i64,
    pub next: i64,
}

impl<T> From<&Page<T>> for Pager {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            pages: page.pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.previous_number(),
            next: page.next_number(),
        }
    }
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%-d %b %Y %H:%M").to_string()
}

/// Select option for the post form's group field.
#[derive(Debug, Clone)]
pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub viewer: Option<Viewer>,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate {
    pub viewer: Option<Viewer>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<Viewer>,
    pub author: String,
    pub author_display: String,
    pub avatar_url: Option<String>,
    pub post_count: i64,
    /// Follow/unfollow affordance: only for authenticated non-authors.
    pub can_follow: bool,
    pub following: bool,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowIndexTemplate {
    pub viewer: Option<Viewer>,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Option<Viewer>,
    pub post: PostCard,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "create_post.html")]
pub struct PostFormTemplate {
    pub viewer: Option<Viewer>,
    pub is_edit: bool,
    pub post_id: i64,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub viewer: Option<Viewer>,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<Viewer>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "logged_out.html")]
pub struct LoggedOutTemplate {
    pub viewer: Option<Viewer>,
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub viewer: Option<Viewer>,
    pub username: String,
    pub email: String,
    pub display: String,
    pub avatar_url: Option<String>,
    pub subscribers: Vec<String>,
}

#[derive(Template)]
#[template(path = "account_update.html")]
pub struct AccountUpdateTemplate {
    pub viewer: Option<Viewer>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub viewer: Option<Viewer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_card() -> PostCard {
        let entry = PostEntry {
            id: 1,
            author_id: 1,
            author_username: "author".into(),
            text: "Тестовый текст".into(),
            image: Some("ab/cd/abcd.gif".into()),
            group: Some(quill_core::models::GroupRef {
                id: 1,
                title: "Rust".into(),
                slug: "rust".into(),
            }),
            created_at: Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap(),
        };
        PostCard::from_entry(&entry, |id| format!("/media/{id}"))
    }

    #[test]
    fn post_card_resolves_media_and_group() {
        let card = sample_card();
        assert_eq!(card.image_url.as_deref(), Some("/media/ab/cd/abcd.gif"));
        assert_eq!(card.group.as_ref().unwrap().slug, "rust");
        assert!(card.created.contains("2024"));
    }

    #[test]
    fn index_renders_posts_and_pager() {
        let html = IndexTemplate {
            viewer: Some(Viewer { username: "reader".into() }),
            posts: vec![sample_card()],
            pager: Pager {
                number: 1,
                pages: 2,
                has_previous: false,
                has_next: true,
                previous: 0,
                next: 2,
            },
        }
        .render()
        .unwrap();
        assert!(html.contains("Тестовый текст"));
        assert!(html.contains("/profile/author/"));
        assert!(html.contains("?page=2"));
        assert!(html.contains("reader"));
    }

    #[test]
    fn post_detail_renders_comments() {
        let html = PostDetailTemplate {
            viewer: None,
            post: sample_card(),
            comments: vec![CommentView {
                author: "reader".into(),
                text: "nice one".into(),
                created: "17 May 2024 12:05".into(),
            }],
            can_edit: false,
        }
        .render()
        .unwrap();
        assert!(html.contains("nice one"));
        // Anonymous visitors get a login link instead of the comment form.
        assert!(html.contains("/auth/login/"));
    }

    #[test]
    fn profile_shows_follow_affordance() {
        let html = ProfileTemplate {
            viewer: Some(Viewer { username: "reader".into() }),
            author: "author".into(),
            author_display: "author".into(),
            avatar_url: None,
            post_count: 3,
            can_follow: true,
            following: false,
            posts: vec![],
            pager: Pager {
                number: 1,
                pages: 1,
                has_previous: false,
                has_next: false,
                previous: 0,
                next: 2,
            },
        }
        .render()
        .unwrap();
        assert!(html.contains("/profile/author/follow/"));
    }
}
