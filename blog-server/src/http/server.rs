//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and timeout middleware
//! - Optional media directory served under the media URL
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes;
use crate::context::MediaUrl;
use crate::store::BlogStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Prefix for image URLs in page contexts
    pub media_url: MediaUrl,

    /// Directory served under `media_url`, for running without a separate file server
    pub media_root: Option<PathBuf>,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
            media_url: MediaUrl::default(),
            media_root: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub media: MediaUrl,
}

/// Build the router with all pages and middleware.
pub fn build_router(store: Arc<dyn BlogStore>, config: &ServerConfig) -> Router {
    let state = AppState {
        store,
        media: config.media_url.clone(),
    };

    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:8000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::index::router())
        .merge(routes::posts::router())
        .merge(routes::tags::router())
        .merge(routes::contacts::router());

    if let Some(root) = &config.media_root {
        match media_mount_path(&config.media_url) {
            Some(mount) => {
                tracing::info!(root = %root.display(), %mount, "serving media files");
                app = app.nest_service(&mount, ServeDir::new(root));
            }
            None => tracing::warn!(
                media_url = config.media_url.as_str(),
                "media_root ignored: media_url is not a local path prefix"
            ),
        }
    }

    app.fallback(unmatched_route)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// JSON 404 for paths no page matches, e.g. `/tag/` with an empty title.
async fn unmatched_route(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "page",
        id: uri.path().to_owned(),
    }
}

/// Path to nest the media directory at, e.g. `/media/` -> `/media`.
fn media_mount_path(media: &MediaUrl) -> Option<String> {
    let prefix = media.as_str();
    if !prefix.starts_with('/') {
        return None;
    }
    let mount = prefix.trim_end_matches('/');
    if mount.is_empty() {
        None
    } else {
        Some(mount.to_owned())
    }
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let store = Arc::new(PgStore::new(pool));
/// run_server(store, ServerConfig::default()).await?;
/// ```
pub async fn run_server(store: Arc<dyn BlogStore>, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(store, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::store::memory::{MemoryStore, NewPost};

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + ChronoDuration::minutes(minutes)
    }

    /// Seven posts; post-N is published at minute N and has N likes.
    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let readers: Vec<_> = (0..7).map(|i| store.add_author(format!("reader{i}"))).collect();

        let rust = store.add_tag("rust");
        let web = store.add_tag("web");
        let travel = store.add_tag("путешествия");
        store.add_tag("empty");

        for i in 0..7 {
            let tags = match i % 3 {
                0 => vec![rust, web],
                1 => vec![web],
                _ => vec![travel],
            };
            let mut post = NewPost::new(format!("Post {i}"), format!("post-{i}"), alice)
                .text("w".repeat(250))
                .published_at(at(i))
                .tags(&tags);
            if i == 6 {
                post = post.image("covers/six.png");
            }
            let id = store.add_post(post);
            for reader in readers.iter().take(i as usize) {
                store.add_like(id, *reader);
            }
        }

        // newest post, no tags, comments inserted out of order
        let post3 = store.add_post(
            NewPost::new("Untagged", "untagged", alice).published_at(at(100)),
        );
        store.add_comment(post3, readers[0], "later", at(102));
        store.add_comment(post3, readers[1], "first!", at(101));

        store
    }

    fn app() -> Router {
        build_router(Arc::new(seeded_store()), &ServerConfig::default())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn slugs(posts: &Value) -> Vec<&str> {
        posts
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["slug"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
        assert_eq!(config.media_url.as_str(), "/media/");
    }

    #[test]
    fn media_mount_paths() {
        assert_eq!(media_mount_path(&MediaUrl::new("/media/")).as_deref(), Some("/media"));
        assert_eq!(
            media_mount_path(&MediaUrl::new("/static/uploads")).as_deref(),
            Some("/static/uploads")
        );
        assert_eq!(media_mount_path(&MediaUrl::new("/")), None);
        assert_eq!(media_mount_path(&MediaUrl::new("https://cdn.example.com")), None);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn index_page() {
        let (status, body) = get(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "index.html");

        let ctx = &body["context"];
        assert_eq!(
            slugs(&ctx["most_popular_posts"]),
            vec!["post-6", "post-5", "post-4", "post-3", "post-2"]
        );
        assert_eq!(
            slugs(&ctx["page_posts"]),
            vec!["untagged", "post-6", "post-5", "post-4", "post-3"]
        );

        let tags = ctx["popular_tags"].as_array().unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0]["title"], "web");
        assert_eq!(tags[0]["posts_with_tag"], 5);
        assert_eq!(tags[3]["title"], "empty");
        assert_eq!(tags[3]["posts_with_tag"], 0);

        let top = &ctx["most_popular_posts"][0];
        assert_eq!(top["teaser_text"].as_str().unwrap().len(), 200);
        assert_eq!(top["image_url"], "/media/covers/six.png");
        assert_eq!(top["first_tag_title"], "rust");
        assert_eq!(top["author"], "alice");

        let untagged = &ctx["page_posts"][0];
        assert_eq!(untagged["comments_amount"], 2);
        assert_eq!(untagged["first_tag_title"], Value::Null);
        assert_eq!(untagged["image_url"], Value::Null);
    }

    #[tokio::test]
    async fn post_detail_page() {
        let (status, body) = get(app(), "/post/untagged").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "post-details.html");

        let post = &body["context"]["post"];
        assert_eq!(post["title"], "Untagged");
        assert_eq!(post["likes_amount"], 0);
        let comments = post["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0]["text"], "first!");
        assert_eq!(comments[0]["author"], "reader1");

        assert_eq!(body["context"]["popular_tags"].as_array().unwrap().len(), 4);
        assert_eq!(
            body["context"]["most_popular_posts"].as_array().unwrap().len(),
            5
        );
    }

    #[tokio::test]
    async fn post_detail_full_text_and_tags() {
        let (_, body) = get(app(), "/post/post-3").await;
        let post = &body["context"]["post"];
        assert_eq!(post["text"].as_str().unwrap().len(), 250);
        assert_eq!(post["likes_amount"], 3);
        assert_eq!(post["tags"][0]["title"], "rust");
        assert_eq!(post["tags"][1]["title"], "web");
    }

    #[tokio::test]
    async fn unknown_post_is_404() {
        let (status, body) = get(app(), "/post/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn malformed_slug_is_404() {
        let (status, _) = get(app(), "/post/bad.slug").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tag_page() {
        let (status, body) = get(app(), "/tag/web").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "posts-list.html");

        let ctx = &body["context"];
        assert_eq!(ctx["tag"], "web");
        assert_eq!(
            slugs(&ctx["posts"]),
            vec!["post-6", "post-4", "post-3", "post-1", "post-0"]
        );
        assert_eq!(ctx["pagination"]["total"], 5);
        assert_eq!(ctx["pagination"]["has_next"], false);
        assert_eq!(ctx["most_popular_posts"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn tag_page_decodes_cyrillic_title() {
        let uri = "/tag/%D0%BF%D1%83%D1%82%D0%B5%D1%88%D0%B5%D1%81%D1%82%D0%B2%D0%B8%D1%8F";
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["context"]["tag"], "путешествия");
        assert_eq!(slugs(&body["context"]["posts"]), vec!["post-5", "post-2"]);
    }

    #[tokio::test]
    async fn tag_page_past_the_end_is_empty() {
        let (status, body) = get(app(), "/tag/web?page=3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["context"]["posts"].as_array().unwrap().is_empty());
        assert_eq!(body["context"]["pagination"]["page"], 3);
        assert_eq!(body["context"]["pagination"]["has_prev"], true);
    }

    #[tokio::test]
    async fn unknown_tag_is_404() {
        let (status, body) = get(app(), "/tag/cooking").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "tag 'cooking' not found");
    }

    #[tokio::test]
    async fn tag_lookup_is_exact() {
        let (status, body) = get(app(), "/tag/%20web").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "tag ' web' not found");
    }

    #[tokio::test]
    async fn empty_tag_title_is_json_404() {
        let (status, body) = get(app(), "/tag/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "page '/tag/' not found");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get(app(), "/archive/2024").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn tag_page_tolerates_bad_page_values() {
        for uri in ["/tag/web?page=-1", "/tag/web?page=", "/tag/web?page=abc", "/tag/web?page=0"] {
            let (status, body) = get(app(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["context"]["pagination"]["page"], 1, "{uri}");
            assert_eq!(slugs(&body["context"]["posts"]).len(), 5, "{uri}");
        }
    }

    #[tokio::test]
    async fn tag_page_huge_page_is_empty() {
        let (status, body) = get(app(), "/tag/web?page=99999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["context"]["posts"].as_array().unwrap().is_empty());
        assert_eq!(body["context"]["pagination"]["page"], u32::MAX);
        assert_eq!(body["context"]["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn contacts_page() {
        let (status, body) = get(app(), "/contacts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "contacts.html");
        assert_eq!(body["context"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn serves_media_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("covers")).unwrap();
        std::fs::write(dir.path().join("covers/six.png"), b"png-bytes").unwrap();

        let config = ServerConfig {
            media_root: Some(dir.path().to_path_buf()),
            ..ServerConfig::default()
        };
        let app = build_router(Arc::new(seeded_store()), &config);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/media/covers/six.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"png-bytes");
    }
}
