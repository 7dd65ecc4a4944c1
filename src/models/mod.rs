//! Persisted entity records read by the templating layer.
//!
//! The records themselves are owned by an external storage layer; this
//! crate reads them through the capabilities in [`crate::store`]. The one
//! write path is the optional create-on-miss for named content items.

mod content_item;
mod page;
mod user;

pub use content_item::{ContentItem, PageContentItem};
pub use page::{CreatePage, Page};
pub use user::{ANONYMOUS_USER_ID, User};
