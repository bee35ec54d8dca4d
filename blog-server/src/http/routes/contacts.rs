//! Contacts page

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::context::Page;

/// Nothing dynamic on this page yet
#[derive(Debug, Serialize)]
pub struct ContactsContext {}

/// GET /contacts
async fn contacts() -> Json<Page<ContactsContext>> {
    Json(Page::new("contacts.html", ContactsContext {}))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/contacts", get(contacts))
}
