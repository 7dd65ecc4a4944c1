//! Storage capabilities consumed by the templating layer.
//!
//! Persistence is an external concern; these traits are the narrow,
//! synchronous surface this crate needs from it. [`MemoryStore`] is an
//! in-process reference backend used by tests and by embedders that load
//! their page tree up front.

mod memory;

use uuid::Uuid;

use crate::models::{ContentItem, Page, PageContentItem};

pub use memory::MemoryStore;

/// Read access to the page tree.
pub trait PageStore: Send + Sync {
    /// All page records, in no particular order. The caller indexes them
    /// into a [`crate::tree::NavTree`] before querying.
    fn all_pages(&self) -> Vec<Page>;

    /// Find a page by id.
    fn find_page(&self, id: Uuid) -> Option<Page>;
}

/// Access to content items and their page bindings.
pub trait ContentStore: Send + Sync {
    /// Find a content item by its unique name.
    fn find_content_item(&self, name: &str) -> Option<ContentItem>;

    /// Create an empty content item with the given name.
    ///
    /// Not guarded against concurrent creation under the same name; the
    /// store may enforce a uniqueness constraint, but this trait does not
    /// require one.
    fn create_content_item(&self, name: &str) -> ContentItem;

    /// All bindings for one block on one page, joined with their content
    /// items, in storage order. Callers sort by `sort` before rendering.
    fn page_content_items(
        &self,
        page_id: Uuid,
        block_name: &str,
    ) -> Vec<(PageContentItem, ContentItem)>;
}
