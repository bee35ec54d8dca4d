//! Schema for authors, posts, tags, comments and likes
//!
//! Every statement is idempotent, so `run` is safe on every startup.

use sqlx::PgPool;

use super::repos::DbError;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "authors",
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            text TEXT NOT NULL,
            slug VARCHAR(255) NOT NULL UNIQUE,
            image TEXT,
            published_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            author_id UUID NOT NULL REFERENCES authors(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title VARCHAR(100) NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_tags",
        r#"
        CREATE TABLE IF NOT EXISTS post_tags (
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, tag_id)
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author_id UUID NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            published_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_likes",
        r#"
        CREATE TABLE IF NOT EXISTS post_likes (
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author_id UUID NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, author_id)
        )
        "#,
    ),
    (
        "indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_posts_published_at ON posts(published_at DESC);
        CREATE INDEX IF NOT EXISTS idx_post_tags_tag ON post_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, published_at);
        "#,
    ),
];

/// Run all schema migrations
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running blog migrations...");

    for (name, sql) in STATEMENTS {
        // raw_sql allows the multi-statement index block
        sqlx::raw_sql(sql).execute(pool).await?;
        tracing::debug!(step = name, "migration applied");
    }

    tracing::info!("Blog migrations complete");
    Ok(())
}
