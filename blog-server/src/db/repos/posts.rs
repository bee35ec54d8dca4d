//! Post repository
//!
//! Every listing is two queries no matter the page size: posts with their
//! author, comment and like counts, then one batched tag prefetch.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{DbError, TagRepo, TagWithCount};
use crate::models::{Paginated, Pagination};

/// Sort order for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    /// Most liked first, newer first on ties
    Popular,
    /// Newest first
    Fresh,
}

impl PostOrder {
    fn order_by(self) -> &'static str {
        match self {
            Self::Popular => "likes_count DESC, p.published_at DESC, p.id",
            Self::Fresh => "p.published_at DESC, p.id",
        }
    }
}

/// Post as shown in listings and sidebars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub comments_count: i64,
    pub likes_count: i64,
    pub tags: Vec<TagWithCount>,
}

/// Post as shown on its own page; comments are fetched separately
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub likes_count: i64,
    pub tags: Vec<TagWithCount>,
}

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    text: String,
    slug: String,
    image: Option<String>,
    published_at: DateTime<Utc>,
    author: String,
    comments_count: i64,
    likes_count: i64,
}

#[derive(FromRow)]
struct PostRowWithTotal {
    #[sqlx(flatten)]
    post: PostRow,
    total: i64,
}

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.text, p.slug, p.image, p.published_at,
    a.username AS author,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
    (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS likes_count
"#;

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Top `limit` posts in the given order, with tags prefetched.
    pub async fn list(&self, order: PostOrder, limit: i64) -> Result<Vec<PostSummary>, DbError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN authors a ON a.id = p.author_id \
             ORDER BY {} LIMIT $1",
            order.order_by()
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        self.attach_tags(rows).await
    }

    /// Posts carrying a tag, newest first.
    pub async fn list_for_tag(
        &self,
        tag_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError> {
        let sql = format!(
            "SELECT {POST_COLUMNS}, COUNT(*) OVER() AS total \
             FROM posts p JOIN authors a ON a.id = p.author_id \
             WHERE EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = $1) \
             ORDER BY p.published_at DESC, p.id \
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, PostRowWithTotal>(&sql)
            .bind(tag_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        // The window total is unavailable once the offset passes the last row
        let total = match rows.first() {
            Some(row) => row.total,
            None if page.page > 1 => self.count_for_tag(tag_id).await?,
            None => 0,
        };

        let items = self
            .attach_tags(rows.into_iter().map(|r| r.post).collect())
            .await?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a single post by slug with author, like count and tags.
    pub async fn get_by_slug(&self, slug: &str) -> Result<PostDetail, DbError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN authors a ON a.id = p.author_id \
             WHERE p.slug = $1"
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "post",
                id: slug.to_owned(),
            })?;

        let mut tags = TagRepo::new(self.pool).for_posts(&[row.id]).await?;

        Ok(PostDetail {
            tags: tags.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
            text: row.text,
            slug: row.slug,
            image: row.image,
            published_at: row.published_at,
            author: row.author,
            likes_count: row.likes_count,
        })
    }

    async fn count_for_tag(&self, tag_id: Uuid) -> Result<i64, DbError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM post_tags WHERE tag_id = $1")
                .bind(tag_id)
                .fetch_one(self.pool)
                .await?;
        Ok(total)
    }

    async fn attach_tags(&self, rows: Vec<PostRow>) -> Result<Vec<PostSummary>, DbError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut tags = TagRepo::new(self.pool).for_posts(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| PostSummary {
                tags: tags.remove(&r.id).unwrap_or_default(),
                id: r.id,
                title: r.title,
                text: r.text,
                slug: r.slug,
                image: r.image,
                published_at: r.published_at,
                author: r.author,
                comments_count: r.comments_count,
                likes_count: r.likes_count,
            })
            .collect())
    }
}
