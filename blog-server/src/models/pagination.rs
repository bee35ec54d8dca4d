//! Pagination for listing pages

use serde::{Deserialize, Serialize};

/// Upper bound for `per_page`
const MAX_PER_PAGE: u32 = 100;

/// Posts per page on the tag listing
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Page selection (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Page is clamped to at least 1, per page to 1..=100.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Total number of pages; an empty listing still has one page.
    pub fn total_pages(&self) -> u32 {
        let per_page = self.per_page.max(1) as i64;
        let pages = (self.total.max(0) + per_page - 1) / per_page;
        pages.max(1) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages(),
            has_next: self.has_next(),
            has_prev: self.has_prev(),
        }
    }

    /// Transform items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Page metadata handed to templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Query parameters for pagination
///
/// `page` is kept as raw text so that `?page=`, `?page=-1` or `?page=abc`
/// land on the first page instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
}

impl PaginationParams {
    /// Requested page, clamped to `1..=u32::MAX`; unparsable input is page 1.
    pub fn page(&self) -> u32 {
        let requested = self
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1);
        u32::try_from(requested.max(1)).unwrap_or(u32::MAX)
    }
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(params.page(), DEFAULT_PER_PAGE)
    }
}
