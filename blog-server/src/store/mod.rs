//! Query helpers behind one trait so views can run against any backend
//!
//! - `PgStore`: production implementation over the sqlx repositories
//! - `MemoryStore`: in-process implementation for tests and local demos

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::repos::{
    CommentRecord, CommentRepo, DbError, PostDetail, PostOrder, PostRepo, PostSummary, Tag,
    TagRepo, TagWithCount,
};
use crate::models::{Paginated, Pagination, PostSlug, TagTitle};

pub mod memory;

pub use memory::MemoryStore;

/// Read-side queries used by the page views
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Top posts in the given order, each with author, counts and tags.
    async fn posts(&self, order: PostOrder, limit: i64) -> Result<Vec<PostSummary>, DbError>;

    async fn post_by_slug(&self, slug: &PostSlug) -> Result<PostDetail, DbError>;

    /// Comments on a post, oldest first.
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, DbError>;

    /// Tags ranked by number of posts.
    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DbError>;

    async fn tag_by_title(&self, title: &TagTitle) -> Result<Tag, DbError>;

    /// Posts carrying the tag, newest first.
    async fn posts_for_tag(
        &self,
        tag_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn posts(&self, order: PostOrder, limit: i64) -> Result<Vec<PostSummary>, DbError> {
        PostRepo::new(&self.pool).list(order, limit).await
    }

    async fn post_by_slug(&self, slug: &PostSlug) -> Result<PostDetail, DbError> {
        PostRepo::new(&self.pool).get_by_slug(slug.as_str()).await
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, DbError> {
        CommentRepo::new(&self.pool).for_post(post_id).await
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DbError> {
        TagRepo::new(&self.pool).popular(limit).await
    }

    async fn tag_by_title(&self, title: &TagTitle) -> Result<Tag, DbError> {
        TagRepo::new(&self.pool).get_by_title(title.as_str()).await
    }

    async fn posts_for_tag(
        &self,
        tag_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError> {
        PostRepo::new(&self.pool).list_for_tag(tag_id, page).await
    }
}
