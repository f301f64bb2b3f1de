//! Limit/offset pagination for API list endpoints. With neither parameter
//! present the endpoint answers with a plain array; with either one it wraps
//! the results in a count/next/previous envelope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LimitOffset {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl LimitOffset {
    pub fn is_active(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

pub fn envelope<T: Serialize>(
    path: &str,
    params: &LimitOffset,
    count: i64,
    results: Vec<T>,
) -> Value {
    let limit = params.limit();
    let offset = params.offset();

    let next = if offset + limit < count {
        Some(format!("{path}?limit={limit}&offset={}", offset + limit))
    } else {
        None
    };
    let previous = if offset > 0 {
        Some(format!("{path}?limit={limit}&offset={}", (offset - limit).max(0)))
    } else {
        None
    };

    json!({
        "count": count,
        "next": next,
        "previous": previous,
        "results": results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_links_walk_the_collection() {
        let params = LimitOffset { limit: Some(5), offset: Some(5) };
        let value = envelope("/api/v1/posts/", &params, 13, vec![1, 2, 3, 4, 5]);
        assert_eq!(value["count"], 13);
        assert_eq!(value["next"], "/api/v1/posts/?limit=5&offset=10");
        assert_eq!(value["previous"], "/api/v1/posts/?limit=5&offset=0");
    }

    #[test]
    fn first_and_last_pages_have_no_dangling_links() {
        let first = LimitOffset { limit: Some(10), offset: None };
        let value = envelope("/api/v1/posts/", &first, 13, vec![0; 10]);
        assert!(value["previous"].is_null());
        assert_eq!(value["next"], "/api/v1/posts/?limit=10&offset=10");

        let last = LimitOffset { limit: Some(10), offset: Some(10) };
        let value = envelope("/api/v1/posts/", &last, 13, vec![0; 3]);
        assert!(value["next"].is_null());
    }

    #[test]
    fn inactive_without_parameters() {
        assert!(!LimitOffset::default().is_active());
        assert!(LimitOffset { limit: None, offset: Some(0) }.is_active());
    }
}
