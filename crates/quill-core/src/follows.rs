//! Follow-graph rules. The follower is always the authenticated actor;
//! duplicates are rejected by the store's uniqueness constraint (a single
//! insert, so two racing follow requests cannot both win).

use crate::error::{AppError, Result};
use crate::models::{FollowEntry, User};
use crate::traits::FollowRepo;

/// Creates a follow edge from `follower` to `author`. Self-follow and
/// duplicate edges come back as validation errors.
pub async fn follow(
    repo: &dyn FollowRepo,
    follower: &User,
    author: &User,
) -> Result<FollowEntry> {
    if follower.id == author.id {
        return Err(AppError::validation("author", "self-follow is forbidden"));
    }
    repo.insert(follower.id, author.id).await
}

/// Web-UI toggle: make sure the edge exists. An already-existing edge (or a
/// self-follow) is a no-op, not an error.
pub async fn toggle_on(repo: &dyn FollowRepo, follower: &User, author: &User) -> Result<()> {
    match follow(repo, follower, author).await {
        Ok(_) | Err(AppError::Validation { .. }) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Removes the follower's own edge if present. Returns whether one existed.
pub async fn unfollow(repo: &dyn FollowRepo, follower_id: i64, author_id: i64) -> Result<bool> {
    repo.delete(follower_id, author_id).await
}
