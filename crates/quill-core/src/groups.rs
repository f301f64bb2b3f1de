//! Group provisioning. Groups are created by administrators (the seed
//! binary); the slug is always derived from the title, and a collision is an
//! explicit conflict rather than a silent overwrite.

use crate::error::{AppError, Result};
use crate::models::{Group, NewGroup};
use crate::traits::GroupRepo;

pub const SLUG_MAX_LEN: usize = 100;

/// URL-safe identifier derived from a title: transliterated, lowercased,
/// hyphen-separated, truncated to [`SLUG_MAX_LEN`].
pub fn derive_slug(title: &str) -> String {
    let mut slug = slug::slugify(title);
    slug.truncate(SLUG_MAX_LEN);
    // Truncation must not leave a trailing separator.
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub async fn create(
    repo: &dyn GroupRepo,
    title: &str,
    description: Option<&str>,
) -> Result<Group> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "title must not be empty"));
    }
    let slug = derive_slug(title);
    if slug.is_empty() {
        return Err(AppError::validation("title", "title does not produce a usable slug"));
    }
    repo.insert(NewGroup {
        title: title.to_string(),
        slug,
        description: description.map(str::trim).filter(|d| !d.is_empty()).map(String::from),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercased_and_hyphenated() {
        assert_eq!(derive_slug("Rust Writers"), "rust-writers");
    }

    #[test]
    fn slug_transliterates_cyrillic() {
        assert_eq!(derive_slug("Тестовая группа"), "testovaia-gruppa");
    }

    #[test]
    fn slug_is_truncated_to_limit() {
        let long = "word ".repeat(40);
        let slug = derive_slug(&long);
        assert!(slug.len() <= SLUG_MAX_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn numeric_titles_survive() {
        assert_eq!(derive_slug("1"), "1");
    }
}
