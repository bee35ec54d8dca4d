//! Post detail page

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::sidebar::{self, Sidebar};
use crate::context::{serialize_post_detail, Page, PostDetailContext};
use crate::http::error::ApiError;
use crate::http::extractors::ValidSlug;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct PostPageContext {
    pub post: PostDetailContext,
    #[serde(flatten)]
    pub sidebar: Sidebar,
}

/// GET /post/{slug}
async fn post_detail(
    State(state): State<Arc<AppState>>,
    ValidSlug(slug): ValidSlug,
) -> Result<Json<Page<PostPageContext>>, ApiError> {
    let store = state.store.as_ref();
    let post = store.post_by_slug(&slug).await?;

    let (comments, sidebar) = tokio::try_join!(
        store.comments_for_post(post.id),
        sidebar::load(store, &state.media),
    )?;

    Ok(Json(Page::new(
        "post-details.html",
        PostPageContext {
            post: serialize_post_detail(&post, &comments, &state.media),
            sidebar,
        },
    )))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/post/{slug}", get(post_detail))
}
