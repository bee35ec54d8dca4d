//! Serialization helpers: query results to plain template contexts
//!
//! Everything here is pure. Views fetch records through `BlogStore`,
//! pass them through these functions and wrap the result in a `Page`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::repos::{CommentRecord, PostDetail, PostSummary, TagWithCount};

pub mod media;

pub use media::MediaUrl;

/// Teaser length in characters
pub const TEASER_LEN: usize = 200;

/// A template name plus the context to render it with
#[derive(Debug, Clone, Serialize)]
pub struct Page<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C: Serialize> Page<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagContext {
    pub title: String,
    pub posts_with_tag: i64,
}

/// Post card used by listings and the popular-posts sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPreview {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagContext>,
    pub first_tag_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentContext {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetailContext {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentContext>,
    pub likes_amount: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagContext>,
}

/// First `TEASER_LEN` characters of `text`.
pub fn teaser(text: &str) -> String {
    match text.char_indices().nth(TEASER_LEN) {
        Some((cut, _)) => text[..cut].to_owned(),
        None => text.to_owned(),
    }
}

pub fn serialize_tag(tag: &TagWithCount) -> TagContext {
    TagContext {
        title: tag.title.clone(),
        posts_with_tag: tag.post_count,
    }
}

pub fn serialize_tags(tags: &[TagWithCount]) -> Vec<TagContext> {
    tags.iter().map(serialize_tag).collect()
}

pub fn serialize_post(post: &PostSummary, media: &MediaUrl) -> PostPreview {
    PostPreview {
        title: post.title.clone(),
        teaser_text: teaser(&post.text),
        author: post.author.clone(),
        comments_amount: post.comments_count,
        image_url: post.image.as_deref().map(|path| media.resolve(path)),
        published_at: post.published_at,
        slug: post.slug.clone(),
        tags: serialize_tags(&post.tags),
        first_tag_title: post.tags.first().map(|t| t.title.clone()),
    }
}

pub fn serialize_posts(posts: &[PostSummary], media: &MediaUrl) -> Vec<PostPreview> {
    posts.iter().map(|p| serialize_post(p, media)).collect()
}

pub fn serialize_comment(comment: &CommentRecord) -> CommentContext {
    CommentContext {
        text: comment.text.clone(),
        published_at: comment.published_at,
        author: comment.author.clone(),
    }
}

pub fn serialize_post_detail(
    post: &PostDetail,
    comments: &[CommentRecord],
    media: &MediaUrl,
) -> PostDetailContext {
    PostDetailContext {
        title: post.title.clone(),
        text: post.text.clone(),
        author: post.author.clone(),
        comments: comments.iter().map(serialize_comment).collect(),
        likes_amount: post.likes_count,
        image_url: post.image.as_deref().map(|path| media.resolve(path)),
        published_at: post.published_at,
        slug: post.slug.clone(),
        tags: serialize_tags(&post.tags),
    }
}
