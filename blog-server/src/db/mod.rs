//! Database layer - connection pool, schema and repositories
//!
//! - Connection pool with a bounded size, shared through `PgStore`
//! - Listing queries fetch related rows in batches, never per post
//! - Counts come from correlated subqueries so joins never multiply rows

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
