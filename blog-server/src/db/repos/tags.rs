//! Tag repository
//!
//! - popular: tags ranked by how many posts carry them
//! - for_posts: batched tag prefetch for a set of posts, with per-tag counts

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

/// Tag record from database
#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Tag annotated with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TagWithCount {
    pub title: String,
    pub post_count: i64,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: Uuid,
    title: String,
    post_count: i64,
}

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most used tags first, ties by title. Unused tags rank last but are kept.
    pub async fn popular(&self, limit: i64) -> Result<Vec<TagWithCount>, DbError> {
        let tags = sqlx::query_as::<_, TagWithCount>(
            r#"
            SELECT t.title, COUNT(pt.post_id) AS post_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id, t.title
            ORDER BY post_count DESC, t.title ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(tags)
    }

    /// Get a tag by its exact title.
    pub async fn get_by_title(&self, title: &str) -> Result<Tag, DbError> {
        sqlx::query_as::<_, Tag>("SELECT id, title, created_at FROM tags WHERE title = $1")
            .bind(title)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "tag",
                id: title.to_owned(),
            })
    }

    /// Tags for each of the given posts, in tag creation order.
    ///
    /// One query regardless of how many posts are passed. Posts without tags
    /// are absent from the map.
    pub async fn for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<TagWithCount>>, DbError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.title, counts.post_count
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            JOIN (
                SELECT tag_id, COUNT(*) AS post_count
                FROM post_tags
                GROUP BY tag_id
            ) counts ON counts.tag_id = t.id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.created_at ASC, t.title ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<TagWithCount>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(TagWithCount {
                title: row.title,
                post_count: row.post_count,
            });
        }

        Ok(by_post)
    }
}
