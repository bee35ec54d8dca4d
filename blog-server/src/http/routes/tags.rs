//! Posts filtered by tag

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::sidebar::{self, Sidebar};
use crate::context::{serialize_post, Page, PostPreview};
use crate::http::error::ApiError;
use crate::http::extractors::ValidTagTitle;
use crate::http::server::AppState;
use crate::models::{PageInfo, Pagination, PaginationParams};

#[derive(Debug, Serialize)]
pub struct TagPageContext {
    pub tag: String,
    pub posts: Vec<PostPreview>,
    pub pagination: PageInfo,
    #[serde(flatten)]
    pub sidebar: Sidebar,
}

/// GET /tag/{tag_title}?page=N
async fn tag_filter(
    State(state): State<Arc<AppState>>,
    ValidTagTitle(title): ValidTagTitle,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<TagPageContext>>, ApiError> {
    let store = state.store.as_ref();
    let page = Pagination::from(params);
    let tag = store.tag_by_title(&title).await?;

    let (posts, sidebar) = tokio::try_join!(
        store.posts_for_tag(tag.id, page),
        sidebar::load(store, &state.media),
    )?;

    let pagination = posts.info();
    let posts = posts.map(|p| serialize_post(&p, &state.media));

    Ok(Json(Page::new(
        "posts-list.html",
        TagPageContext {
            tag: tag.title,
            posts: posts.items,
            pagination,
            sidebar,
        },
    )))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tag/{tag_title}", get(tag_filter))
}
