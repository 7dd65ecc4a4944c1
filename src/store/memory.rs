//! In-memory store backend.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::models::{ContentItem, CreatePage, Page, PageContentItem};

use super::{ContentStore, PageStore};

#[derive(Debug, Default)]
struct Inner {
    pages: HashMap<Uuid, Page>,
    content_items: HashMap<Uuid, ContentItem>,
    bindings: Vec<PageContentItem>,
}

/// In-process store implementing [`PageStore`] and [`ContentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a page, returning the stored record.
    pub fn add_page(&self, input: CreatePage) -> Page {
        let page = Page::new(input);
        self.inner.write().pages.insert(page.id, page.clone());
        page
    }

    /// Insert an existing page record, replacing any same-id record.
    pub fn insert_page(&self, page: Page) {
        self.inner.write().pages.insert(page.id, page);
    }

    /// Insert an existing content item record.
    pub fn insert_content_item(&self, item: ContentItem) {
        self.inner.write().content_items.insert(item.id, item);
    }

    /// Bind a content item into a named block on a page.
    pub fn attach(
        &self,
        page_id: Uuid,
        content_item_id: Uuid,
        block_name: &str,
        sort: i32,
    ) -> PageContentItem {
        let binding = PageContentItem::new(page_id, content_item_id, block_name, sort);
        self.inner.write().bindings.push(binding.clone());
        binding
    }

    /// Number of stored content items.
    pub fn content_item_count(&self) -> usize {
        self.inner.read().content_items.len()
    }
}

impl PageStore for MemoryStore {
    fn all_pages(&self) -> Vec<Page> {
        self.inner.read().pages.values().cloned().collect()
    }

    fn find_page(&self, id: Uuid) -> Option<Page> {
        self.inner.read().pages.get(&id).cloned()
    }
}

impl ContentStore for MemoryStore {
    fn find_content_item(&self, name: &str) -> Option<ContentItem> {
        self.inner
            .read()
            .content_items
            .values()
            .find(|item| item.name == name)
            .cloned()
    }

    fn create_content_item(&self, name: &str) -> ContentItem {
        let item = ContentItem::empty(name);
        self.inner
            .write()
            .content_items
            .insert(item.id, item.clone());
        item
    }

    fn page_content_items(
        &self,
        page_id: Uuid,
        block_name: &str,
    ) -> Vec<(PageContentItem, ContentItem)> {
        let inner = self.inner.read();
        let mut rows = Vec::new();
        for binding in &inner.bindings {
            if binding.page_id != page_id || binding.block_name != block_name {
                continue;
            }
            match inner.content_items.get(&binding.content_item_id) {
                Some(item) => rows.push((binding.clone(), item.clone())),
                None => {
                    warn!(
                        binding = %binding.id,
                        content_item = %binding.content_item_id,
                        "binding references a missing content item"
                    );
                }
            }
        }
        rows
    }
}
