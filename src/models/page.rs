//! Page model: one node of the site tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page record.
///
/// Pages form a forest via `parent_id`; sibling order is `weight`
/// ascending (ties broken by `created`, then `id`). Depth and nested-set
/// intervals are not stored — [`crate::tree::NavTree`] derives them when
/// it indexes the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Optional parent page; `None` marks a tree root.
    pub parent_id: Option<Uuid>,

    /// Display title. Top-level pages double as menu roots, looked up
    /// by title.
    pub title: String,

    /// Link destination path (e.g. "/about/team").
    pub path: String,

    /// Sort weight among siblings (lower = earlier).
    pub weight: i32,

    /// Whether the page appears in menus at all.
    pub show_in_menu: bool,

    /// Whether anonymous visitors may see the page. Non-public pages are
    /// subject to the injected access policy.
    pub public: bool,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a page.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePage {
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub path: String,
    pub weight: Option<i32>,
    pub show_in_menu: Option<bool>,
    pub public: Option<bool>,
}

impl Page {
    /// Build a page record from creation input.
    pub fn new(input: CreatePage) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: Uuid::now_v7(),
            parent_id: input.parent_id,
            title: input.title,
            path: input.path,
            weight: input.weight.unwrap_or(0),
            show_in_menu: input.show_in_menu.unwrap_or(true),
            public: input.public.unwrap_or(true),
            created: now,
            changed: now,
        }
    }
}
