//! # Core Traits (Ports)
//!
//! Contracts between the domain and its adapters. The binaries pick concrete
//! implementations (SQLite store, argon2 credentials, local media directory)
//! and hand them to the HTTP layer as `Arc<dyn ...>`.
//!
//! Repositories enforce uniqueness and foreign-key invariants at the store
//! level: a duplicate follow or a taken username comes back as a domain error
//! produced from the constraint violation, never from a read-then-write
//! pre-check.

use async_trait::async_trait;

use crate::error::Result;
use crate::feed::FeedFilter;
use crate::models::{
    CommentEntry, FollowEntry, Group, NewComment, NewGroup, NewPost, NewUser, PostChanges,
    PostEntry, ProfileChanges, TokenPair, User,
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a new account. A taken username or email surfaces as a
    /// `Validation` error on the respective field.
    async fn insert(&self, new: NewUser) -> Result<User>;
    async fn find(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User>;
}

#[async_trait]
pub trait GroupRepo: Send + Sync {
    /// A colliding slug surfaces as `Conflict`.
    async fn insert(&self, new: NewGroup) -> Result<Group>;
    async fn find(&self, id: i64) -> Result<Option<Group>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>>;
    async fn list(&self) -> Result<Vec<Group>>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn insert(&self, new: NewPost) -> Result<PostEntry>;
    async fn find(&self, id: i64) -> Result<Option<PostEntry>>;
    async fn update(&self, id: i64, changes: PostChanges) -> Result<PostEntry>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn count(&self, filter: &FeedFilter) -> Result<i64>;
    /// Newest-first listing under `filter`.
    async fn list(&self, filter: &FeedFilter, limit: i64, offset: i64) -> Result<Vec<PostEntry>>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, new: NewComment) -> Result<CommentEntry>;
    async fn find(&self, id: i64) -> Result<Option<CommentEntry>>;
    /// Oldest-first, the order a discussion reads in.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>>;
    async fn update_text(&self, id: i64, text: &str) -> Result<CommentEntry>;
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait FollowRepo: Send + Sync {
    /// Single constrained insert; a duplicate (user, author) pair surfaces as
    /// a `Validation` error from the store's uniqueness constraint.
    async fn insert(&self, user_id: i64, author_id: i64) -> Result<FollowEntry>;
    /// Returns whether an edge was actually removed.
    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool>;
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool>;
    /// Only edges where `user_id` is the follower; optional substring search
    /// over the followee's username.
    async fn list_for_user(&self, user_id: i64, search: Option<&str>) -> Result<Vec<FollowEntry>>;
    /// Edges pointing at `author_id`, i.e. that author's subscribers.
    async fn list_followers(&self, author_id: i64) -> Result<Vec<FollowEntry>>;
}

/// Credential management and login checks.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn hash_password(&self, raw: &str) -> Result<String>;
    /// Login with either a username or an email address in `identifier`
    /// ("@" selects the email lookup). Unknown identifier and bad password
    /// are indistinguishable to the caller.
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<Option<User>>;
}

/// Bearer tokens for the JSON API.
pub trait TokenService: Send + Sync {
    fn issue_pair(&self, user_id: i64) -> Result<TokenPair>;
    /// Exchanges a valid refresh token for a fresh access token.
    fn refresh(&self, refresh_token: &str) -> Result<String>;
    /// Returns the user id carried by a valid access token.
    fn verify(&self, access_token: &str) -> Result<i64>;
    /// Signature/expiry check for either token kind (the `verify` endpoint).
    fn validate(&self, token: &str) -> Result<()>;
}

/// Media storage contract for image attachments and avatars.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates that `data` is a decodable image and stores it, returning a
    /// media id usable with [`MediaStore::url`].
    async fn save(&self, data: Vec<u8>) -> Result<String>;
    /// Public URL path for a stored media id.
    fn url(&self, media_id: &str) -> String;
}

/// Outbound mail. Callers treat delivery as best-effort (spawned
/// fire-and-forget from the request path).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}
