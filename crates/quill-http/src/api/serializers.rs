//! Wire shapes for the JSON API and the input-side helpers.
//!
//! Read-only fields (ids, authors, timestamps, the comment's parent post)
//! exist only on the output structs, so a client cannot supply them at all.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use quill_core::models::{CommentEntry, FollowEntry, Group, PostEntry};
use quill_core::traits::MediaStore;

use crate::error::ApiError;

/// Distinguishes an absent field from an explicit `null`: absent stays
/// `None` (untouched), `null` becomes `Some(None)` (clear).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accepts a raw base64 payload or a `data:*;base64,` URI.
pub fn decode_image(raw: &str) -> Result<Vec<u8>, ApiError> {
    let payload = raw.rsplit_once("base64,").map(|(_, rest)| rest).unwrap_or(raw);
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::field("image", "invalid base64-encoded image"))
}

#[derive(Debug, Serialize)]
pub struct PostOut {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub image: Option<String>,
    pub group: Option<i64>,
}

impl PostOut {
    pub fn from_entry(entry: &PostEntry, media: &dyn MediaStore) -> Self {
        Self {
            id: entry.id,
            author: entry.author_username.clone(),
            text: entry.text.clone(),
            created: entry.created_at,
            image: entry.image.as_deref().map(|id| media.url(id)),
            group: entry.group.as_ref().map(|g| g.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostIn {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub group: Option<Option<i64>>,
}

#[derive(Debug, Serialize)]
pub struct CommentOut {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
    pub post: i64,
}

impl From<&CommentEntry> for CommentOut {
    fn from(entry: &CommentEntry) -> Self {
        Self {
            id: entry.id,
            author: entry.author_username.clone(),
            text: entry.text.clone(),
            created: entry.created_at,
            post: entry.post_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentIn {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupOut {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
}

impl From<&Group> for GroupOut {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FollowOut {
    pub id: i64,
    pub user: String,
    pub author: String,
}

impl From<&FollowEntry> for FollowOut {
    fn from(entry: &FollowEntry) -> Self {
        Self {
            id: entry.id,
            user: entry.user_username.clone(),
            author: entry.author_username.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowIn {
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_option_tells_null_from_absent() {
        let absent: PostIn = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(absent.group.is_none());

        let null: PostIn = serde_json::from_str(r#"{"text": "hi", "group": null}"#).unwrap();
        assert_eq!(null.group, Some(None));

        let set: PostIn = serde_json::from_str(r#"{"text": "hi", "group": 3}"#).unwrap();
        assert_eq!(set.group, Some(Some(3)));
    }

    #[test]
    fn decode_image_accepts_raw_and_data_uri() {
        let bytes = decode_image("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        let bytes = decode_image("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert!(decode_image("!!not base64!!").is_err());
    }
}
