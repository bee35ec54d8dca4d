//! blog-server: page views for a small blog
//!
//! Serves the homepage, post details, tag listings and contacts as
//! JSON page contexts (`{"template", "context"}`) for a rendering layer.
//! Data comes from PostgreSQL through the `BlogStore` query helpers.

pub mod context;
pub mod db;
pub mod http;
pub mod models;
pub mod store;

pub use http::{build_router, run_server, ServerConfig};
pub use store::{BlogStore, MemoryStore, PgStore};
