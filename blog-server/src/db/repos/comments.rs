//! Comment repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

/// Comment with its author's username joined in
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentRecord {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All comments on a post, oldest first.
    pub async fn for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, DbError> {
        let comments = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT c.text, c.published_at, a.username AS author
            FROM comments c
            JOIN authors a ON a.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.published_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }
}
