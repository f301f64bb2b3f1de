//! Feed composition: one filter enum drives the global, per-group,
//! per-author and subscription listings through the same repository call.

use crate::error::Result;
use crate::models::PostEntry;
use crate::pagination::{clamp_page, page_count, Page, PAGE_SIZE};
use crate::traits::PostRepo;

/// Which posts a feed shows. Ordering is always newest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFilter {
    /// All posts, unfiltered.
    Global,
    /// Posts filed under one group.
    Group(i64),
    /// Posts by one author.
    Author(i64),
    /// Posts by every author the given user follows.
    SubscriptionsOf(i64),
}

/// Fetches one fixed-size page of the feed. Out-of-range page numbers clamp
/// to the last page, so a stale pager link never 404s.
pub async fn page(
    repo: &dyn PostRepo,
    filter: &FeedFilter,
    requested: Option<i64>,
) -> Result<Page<PostEntry>> {
    let total = repo.count(filter).await?;
    let pages = page_count(total, PAGE_SIZE);
    let number = clamp_page(requested, pages);
    let items = repo.list(filter, PAGE_SIZE, (number - 1) * PAGE_SIZE).await?;
    Ok(Page { items, number, pages, total })
}
