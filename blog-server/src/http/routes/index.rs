//! Homepage

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::{FRESH_POSTS_LIMIT, POPULAR_POSTS_LIMIT, POPULAR_TAGS_LIMIT};
use crate::context::{serialize_posts, serialize_tags, Page, PostPreview, TagContext};
use crate::db::repos::PostOrder;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub most_popular_posts: Vec<PostPreview>,
    pub page_posts: Vec<PostPreview>,
    pub popular_tags: Vec<TagContext>,
}

/// GET / - popular posts, newest posts and popular tags
async fn index(State(state): State<Arc<AppState>>) -> Result<Json<Page<IndexContext>>, ApiError> {
    let store = state.store.as_ref();
    let (popular, fresh, tags) = tokio::try_join!(
        store.posts(PostOrder::Popular, POPULAR_POSTS_LIMIT),
        store.posts(PostOrder::Fresh, FRESH_POSTS_LIMIT),
        store.popular_tags(POPULAR_TAGS_LIMIT),
    )?;

    tracing::debug!(
        popular = popular.len(),
        fresh = fresh.len(),
        tags = tags.len(),
        "homepage loaded"
    );

    Ok(Json(Page::new(
        "index.html",
        IndexContext {
            most_popular_posts: serialize_posts(&popular, &state.media),
            page_posts: serialize_posts(&fresh, &state.media),
            popular_tags: serialize_tags(&tags),
        },
    )))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}
