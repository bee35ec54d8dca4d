//! Domain models with validation at construction
//!
//! Path segments are validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod slug;
pub mod tag;
pub mod pagination;

pub use validation::ValidationError;
pub use slug::PostSlug;
pub use tag::TagTitle;
pub use pagination::{PageInfo, Paginated, Pagination, PaginationParams};
