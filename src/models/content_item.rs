//! Content item models: reusable fragments and their page bindings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, reusable content fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Unique lookup name (e.g. "footer").
    pub name: String,

    /// Stored HTML body. Sanitization happens upstream, before storage.
    pub html: String,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl ContentItem {
    /// Build an empty item with the given name, as created on a lookup
    /// miss when auto-creation is enabled.
    pub fn empty(name: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: Uuid::now_v7(),
            name: name.to_string(),
            html: String::new(),
            created: now,
            changed: now,
        }
    }
}

/// Binds a [`ContentItem`] into a named block on one page.
///
/// Several bindings may share a block name on the same page; render order
/// within the block is `sort` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContentItem {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Page this binding belongs to.
    pub page_id: Uuid,

    /// Bound content item.
    pub content_item_id: Uuid,

    /// Block name within the page template (e.g. "main", "sidebar").
    pub block_name: String,

    /// Sort order within the block (lower = earlier).
    pub sort: i32,

    /// Unix timestamp when created.
    pub created: i64,
}

impl PageContentItem {
    /// Build a binding record.
    pub fn new(page_id: Uuid, content_item_id: Uuid, block_name: &str, sort: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            page_id,
            content_item_id,
            block_name: block_name.to_string(),
            sort,
            created: chrono::Utc::now().timestamp(),
        }
    }
}
