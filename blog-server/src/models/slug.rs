//! Post slug validation
//!
//! Same alphabet as a URL slug path converter: ASCII letters, digits,
//! hyphens and underscores.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for post slugs (matches the `posts.slug` column)
const MAX_SLUG_LEN: usize = 255;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("invalid slug regex"));

/// Validated post slug
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostSlug(String);

impl PostSlug {
    /// Create a new slug, validating its format.
    ///
    /// # Example
    /// ```
    /// use blog_server::models::PostSlug;
    ///
    /// assert!(PostSlug::new("hello-world_2").is_ok());
    /// assert!(PostSlug::new("hello world").is_err());
    /// assert!(PostSlug::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must contain only letters, digits, hyphens and underscores",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
