//! Path extractors for slugs and tag titles
//!
//! A malformed segment can never match a stored row, so it is reported as
//! not found rather than as a bad request.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiError;
use crate::models::{PostSlug, TagTitle};

/// Extract and validate a post slug from path
pub struct ValidSlug(pub PostSlug);

impl<S> FromRequestParts<S> for ValidSlug
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(slug): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found("post", String::new()))?;

        let valid = PostSlug::new(&slug).map_err(|e| {
            tracing::debug!(%slug, reason = %e, "rejecting post slug");
            not_found("post", slug.clone())
        })?;
        Ok(Self(valid))
    }
}

/// Extract and validate a tag title from path
pub struct ValidTagTitle(pub TagTitle);

impl<S> FromRequestParts<S> for ValidTagTitle
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(title): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found("tag", String::new()))?;

        let valid = TagTitle::new(&title).map_err(|e| {
            tracing::debug!(%title, reason = %e, "rejecting tag title");
            not_found("tag", title.clone())
        })?;
        Ok(Self(valid))
    }
}

fn not_found(resource: &'static str, id: String) -> ApiError {
    ApiError::NotFound { resource, id }
}
