//! Popular tags and popular posts, shown beside every post and listing

use serde::Serialize;

use super::{POPULAR_POSTS_LIMIT, POPULAR_TAGS_LIMIT};
use crate::context::{serialize_posts, serialize_tags, MediaUrl, PostPreview, TagContext};
use crate::db::repos::{DbError, PostOrder};
use crate::store::BlogStore;

#[derive(Debug, Serialize)]
pub struct Sidebar {
    pub popular_tags: Vec<TagContext>,
    pub most_popular_posts: Vec<PostPreview>,
}

/// Fetch both sidebar blocks concurrently.
pub async fn load(store: &dyn BlogStore, media: &MediaUrl) -> Result<Sidebar, DbError> {
    let (tags, posts) = tokio::try_join!(
        store.popular_tags(POPULAR_TAGS_LIMIT),
        store.posts(PostOrder::Popular, POPULAR_POSTS_LIMIT),
    )?;

    Ok(Sidebar {
        popular_tags: serialize_tags(&tags),
        most_popular_posts: serialize_posts(&posts, media),
    })
}
