//! The central domain logic and interface definitions for Quill.

pub mod cache;
pub mod error;
pub mod feed;
pub mod follows;
pub mod groups;
pub mod models;
pub mod pagination;
pub mod traits;

pub use error::{AppError, Result};
pub use feed::FeedFilter;
pub use models::*;
pub use traits::*;
