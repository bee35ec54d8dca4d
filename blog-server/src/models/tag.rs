//! Tag title validation

use super::ValidationError;

/// Maximum length for tag titles (matches the `tags.title` column)
const MAX_TAG_TITLE_LEN: usize = 100;

/// Validated tag title, as it appears in `/tag/{tag_title}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagTitle(String);

impl TagTitle {
    /// Create a new tag title.
    ///
    /// # Rules
    /// - Not blank; surrounding whitespace is kept, lookups are exact
    /// - Max 100 characters (not bytes - titles are often Cyrillic)
    /// - No `/`, the title is a single path segment
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "tag title" });
        }

        if s.chars().count() > MAX_TAG_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "tag title",
                max: MAX_TAG_TITLE_LEN,
            });
        }

        if s.contains('/') {
            return Err(ValidationError::InvalidFormat {
                field: "tag title",
                reason: "must not contain '/'",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
