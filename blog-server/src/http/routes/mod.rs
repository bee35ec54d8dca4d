//! Route handlers organized by page

pub mod contacts;
pub mod health;
pub mod index;
pub mod posts;
pub mod sidebar;
pub mod tags;

/// Posts in the "most popular" sidebar block
pub const POPULAR_POSTS_LIMIT: i64 = 5;

/// Newest posts on the homepage
pub const FRESH_POSTS_LIMIT: i64 = 5;

/// Tags in the "popular tags" block
pub const POPULAR_TAGS_LIMIT: i64 = 5;
