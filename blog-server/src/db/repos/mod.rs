//! Repository implementations for database access

pub mod comments;
pub mod posts;
pub mod tags;

pub use comments::{CommentRecord, CommentRepo};
pub use posts::{PostDetail, PostOrder, PostRepo, PostSummary};
pub use tags::{Tag, TagRepo, TagWithCount};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}
