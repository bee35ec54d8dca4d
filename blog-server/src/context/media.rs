//! Image URL resolution

/// Public prefix that uploaded images are served under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrl(String);

impl MediaUrl {
    /// Normalises the prefix to end with exactly one `/`.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        Self(format!("{trimmed}/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL for a stored image path. Absolute URLs pass through untouched.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}{}", self.0, path.trim_start_matches('/'))
    }
}

impl Default for MediaUrl {
    fn default() -> Self {
        Self::new("/media/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_prefix() {
        assert_eq!(MediaUrl::new("/media").as_str(), "/media/");
        assert_eq!(MediaUrl::new("/media//").as_str(), "/media/");
        assert_eq!(MediaUrl::new("").as_str(), "/");
    }

    #[test]
    fn joins_with_single_slash() {
        let media = MediaUrl::default();
        assert_eq!(media.resolve("posts/cat.jpg"), "/media/posts/cat.jpg");
        assert_eq!(media.resolve("/posts/cat.jpg"), "/media/posts/cat.jpg");

        let cdn = MediaUrl::new("https://cdn.example.com/m");
        assert_eq!(cdn.resolve("cat.jpg"), "https://cdn.example.com/m/cat.jpg");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let media = MediaUrl::default();
        assert_eq!(
            media.resolve("https://img.example.com/a.png"),
            "https://img.example.com/a.png"
        );
    }
}
