//! # Domain Models
//!
//! Plain data carriers for the blog domain. Write models (`New*`, `*Changes`)
//! are what the handlers hand to a repository; the `*Entry` read models come
//! back with the joined fields the pages and serializers actually render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. `password_hash` is an argon2 PHC string and never
/// leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Media id of the avatar image, if one was uploaded.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last" when both names are set, otherwise the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Self-service profile update. `avatar` carries a freshly stored media id;
/// `None` keeps the current one.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

/// A category posts can be filed under. Referenced, never owned, by posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    /// URL-safe identifier derived from the title, unique, max 100 chars.
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Slim group reference carried inside a [`PostEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    /// Media id of an attached image.
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

/// Partial update for a post. Outer `None` leaves the field untouched,
/// `Some(None)` clears it. The author and creation timestamp are immutable.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group_id: Option<Option<i64>>,
}

/// A post joined with the author and group fields every listing needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub image: Option<String>,
    pub group: Option<GroupRef>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    /// Always taken from the URL path, never from a submitted body.
    pub post_id: i64,
    /// Always the authenticated actor.
    pub author_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEntry {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A directed "user subscribes to author" edge. The (user, author) pair is
/// unique at the store level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEntry {
    pub id: i64,
    pub user_id: i64,
    pub user_username: String,
    pub author_id: i64,
    pub author_username: String,
}

/// Access + refresh bearer tokens for the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}
