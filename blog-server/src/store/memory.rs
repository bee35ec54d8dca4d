//! In-memory store for testing
//!
//! Populated up front through `&mut self` builders, then shared read-only.
//! Orderings and counts follow the SQL in `db::repos`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::BlogStore;
use crate::db::repos::{
    CommentRecord, DbError, PostDetail, PostOrder, PostSummary, Tag, TagWithCount,
};
use crate::models::{Paginated, Pagination, PostSlug, TagTitle};

/// Post to insert into a `MemoryStore`
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub author: Uuid,
    pub text: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub tags: Vec<Uuid>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, slug: impl Into<String>, author: Uuid) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            author,
            text: String::new(),
            image: None,
            published_at: Utc::now(),
            tags: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = at;
        self
    }

    pub fn tags(mut self, tags: &[Uuid]) -> Self {
        self.tags = tags.to_vec();
        self
    }
}

struct StoredPost {
    id: Uuid,
    post: NewPost,
}

struct StoredComment {
    post_id: Uuid,
    author: Uuid,
    text: String,
    published_at: DateTime<Utc>,
}

/// In-memory `BlogStore`
#[derive(Default)]
pub struct MemoryStore {
    authors: HashMap<Uuid, String>,
    tags: Vec<Tag>,
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
    likes: HashSet<(Uuid, Uuid)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_author(&mut self, username: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.authors.insert(id, username.into());
        id
    }

    /// Tags keep insertion order as their creation order.
    pub fn add_tag(&mut self, title: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let created_at = match self.tags.last() {
            Some(last) => last.created_at + Duration::seconds(1),
            None => Utc::now(),
        };
        self.tags.push(Tag {
            id,
            title: title.into(),
            created_at,
        });
        id
    }

    pub fn add_post(&mut self, post: NewPost) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.push(StoredPost { id, post });
        id
    }

    pub fn add_comment(
        &mut self,
        post_id: Uuid,
        author: Uuid,
        text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) {
        self.comments.push(StoredComment {
            post_id,
            author,
            text: text.into(),
            published_at,
        });
    }

    /// Likes are a set; liking twice counts once.
    pub fn add_like(&mut self, post_id: Uuid, author: Uuid) {
        self.likes.insert((post_id, author));
    }

    fn username(&self, author: Uuid) -> String {
        self.authors.get(&author).cloned().unwrap_or_default()
    }

    fn tag_post_count(&self, tag_id: Uuid) -> i64 {
        self.posts
            .iter()
            .filter(|p| p.post.tags.contains(&tag_id))
            .count() as i64
    }

    fn tags_for(&self, post: &NewPost) -> Vec<TagWithCount> {
        self.tags
            .iter()
            .filter(|t| post.tags.contains(&t.id))
            .map(|t| TagWithCount {
                title: t.title.clone(),
                post_count: self.tag_post_count(t.id),
            })
            .collect()
    }

    fn likes_count(&self, post_id: Uuid) -> i64 {
        self.likes.iter().filter(|(p, _)| *p == post_id).count() as i64
    }

    fn summary(&self, stored: &StoredPost) -> PostSummary {
        let post = &stored.post;
        PostSummary {
            id: stored.id,
            title: post.title.clone(),
            text: post.text.clone(),
            slug: post.slug.clone(),
            image: post.image.clone(),
            published_at: post.published_at,
            author: self.username(post.author),
            comments_count: self
                .comments
                .iter()
                .filter(|c| c.post_id == stored.id)
                .count() as i64,
            likes_count: self.likes_count(stored.id),
            tags: self.tags_for(post),
        }
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn posts(&self, order: PostOrder, limit: i64) -> Result<Vec<PostSummary>, DbError> {
        let mut posts: Vec<PostSummary> = self.posts.iter().map(|p| self.summary(p)).collect();
        match order {
            PostOrder::Popular => posts.sort_by(|a, b| {
                b.likes_count
                    .cmp(&a.likes_count)
                    .then(b.published_at.cmp(&a.published_at))
                    .then(a.id.cmp(&b.id))
            }),
            PostOrder::Fresh => {
                posts.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)))
            }
        }
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn post_by_slug(&self, slug: &PostSlug) -> Result<PostDetail, DbError> {
        let stored = self
            .posts
            .iter()
            .find(|p| p.post.slug == slug.as_str())
            .ok_or_else(|| DbError::NotFound {
                resource: "post",
                id: slug.as_str().to_owned(),
            })?;

        let post = &stored.post;
        Ok(PostDetail {
            id: stored.id,
            title: post.title.clone(),
            text: post.text.clone(),
            slug: post.slug.clone(),
            image: post.image.clone(),
            published_at: post.published_at,
            author: self.username(post.author),
            likes_count: self.likes_count(stored.id),
            tags: self.tags_for(post),
        })
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, DbError> {
        let mut comments: Vec<CommentRecord> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentRecord {
                text: c.text.clone(),
                published_at: c.published_at,
                author: self.username(c.author),
            })
            .collect();
        // stable: same-instant comments stay in insertion order
        comments.sort_by_key(|c| c.published_at);
        Ok(comments)
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DbError> {
        let mut tags: Vec<TagWithCount> = self
            .tags
            .iter()
            .map(|t| TagWithCount {
                title: t.title.clone(),
                post_count: self.tag_post_count(t.id),
            })
            .collect();
        tags.sort_by(|a, b| b.post_count.cmp(&a.post_count).then(a.title.cmp(&b.title)));
        tags.truncate(limit.max(0) as usize);
        Ok(tags)
    }

    async fn tag_by_title(&self, title: &TagTitle) -> Result<Tag, DbError> {
        self.tags
            .iter()
            .find(|t| t.title == title.as_str())
            .cloned()
            .ok_or_else(|| DbError::NotFound {
                resource: "tag",
                id: title.as_str().to_owned(),
            })
    }

    async fn posts_for_tag(
        &self,
        tag_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError> {
        let mut posts: Vec<PostSummary> = self
            .posts
            .iter()
            .filter(|p| p.post.tags.contains(&tag_id))
            .map(|p| self.summary(p))
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)));

        let total = posts.len() as i64;
        let items = posts
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn popular_ranks_by_likes_then_recency() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let bob = store.add_author("bob");

        let old = store.add_post(NewPost::new("Old", "old", alice).published_at(at(1)));
        let new = store.add_post(NewPost::new("New", "new", alice).published_at(at(2)));
        let liked = store.add_post(NewPost::new("Liked", "liked", bob).published_at(at(0)));
        store.add_like(liked, alice);
        store.add_like(liked, alice);
        store.add_like(liked, bob);
        store.add_like(old, bob);
        store.add_like(new, bob);

        let posts = store.posts(PostOrder::Popular, 5).await.unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["liked", "new", "old"]);
        // liking twice counts once
        assert_eq!(posts[0].likes_count, 2);

        let fresh = store.posts(PostOrder::Fresh, 2).await.unwrap();
        let slugs: Vec<&str> = fresh.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn full_ties_fall_back_to_id() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let mut ids = vec![
            store.add_post(NewPost::new("A", "a", alice).published_at(at(1))),
            store.add_post(NewPost::new("B", "b", alice).published_at(at(1))),
            store.add_post(NewPost::new("C", "c", alice).published_at(at(1))),
        ];
        ids.sort();

        for order in [PostOrder::Popular, PostOrder::Fresh] {
            let posts = store.posts(order, 5).await.unwrap();
            let listed: Vec<_> = posts.iter().map(|p| p.id).collect();
            assert_eq!(listed, ids);
        }
    }

    #[tokio::test]
    async fn tags_carry_counts_in_creation_order() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let web = store.add_tag("web");
        let rust = store.add_tag("rust");

        store.add_post(NewPost::new("A", "a", alice).tags(&[rust, web]));
        store.add_post(NewPost::new("B", "b", alice).tags(&[rust]));

        let slug = PostSlug::new("a").unwrap();
        let post = store.post_by_slug(&slug).await.unwrap();
        assert_eq!(
            post.tags,
            vec![
                TagWithCount { title: "web".into(), post_count: 1 },
                TagWithCount { title: "rust".into(), post_count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn popular_tags_keep_unused_tags_last() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        store.add_tag("unused");
        let b = store.add_tag("b");
        let a = store.add_tag("a");
        store.add_post(NewPost::new("P", "p", alice).tags(&[a, b]));

        let tags = store.popular_tags(5).await.unwrap();
        let titles: Vec<&str> = tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "unused"]);
        assert_eq!(tags[2].post_count, 0);
    }

    #[tokio::test]
    async fn posts_for_tag_paginates_newest_first() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let rust = store.add_tag("rust");
        for i in 0..25 {
            store.add_post(
                NewPost::new(format!("Post {i}"), format!("post-{i}"), alice)
                    .published_at(at(i))
                    .tags(&[rust]),
            );
        }
        store.add_post(NewPost::new("Untagged", "untagged", alice).published_at(at(100)));

        let first = store
            .posts_for_tag(rust, Pagination::new(1, 20))
            .await
            .unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.items[0].slug, "post-24");

        let second = store
            .posts_for_tag(rust, Pagination::new(2, 20))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.items[4].slug, "post-0");

        let past_end = store
            .posts_for_tag(rust, Pagination::new(3, 20))
            .await
            .unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 25);
    }

    #[tokio::test]
    async fn comments_oldest_first_with_author() {
        let mut store = MemoryStore::new();
        let alice = store.add_author("alice");
        let bob = store.add_author("bob");
        let post = store.add_post(NewPost::new("P", "p", alice));
        store.add_comment(post, bob, "second", at(5));
        store.add_comment(post, alice, "first", at(1));

        let comments = store.comments_for_post(post).await.unwrap();
        assert_eq!(comments[0].text, "first");
        assert_eq!(comments[0].author, "alice");
        assert_eq!(comments[1].author, "bob");
    }

    #[tokio::test]
    async fn unknown_lookups_are_not_found() {
        let store = MemoryStore::new();

        let err = store
            .post_by_slug(&PostSlug::new("missing").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "post", .. }));

        let err = store
            .tag_by_title(&TagTitle::new("missing").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "tag", .. }));
    }
}
