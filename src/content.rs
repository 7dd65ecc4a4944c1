//! Content block resolution and named content-item lookup.

use serde::Serialize;
use tracing::debug;

use crate::models::{ContentItem, Page, PageContentItem};
use crate::settings::Settings;
use crate::store::ContentStore;

/// One rendered block entry: a content item plus the binding record that
/// placed it in the block (the binding carries per-item edit metadata).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockItem {
    pub item: ContentItem,
    pub binding: PageContentItem,
}

/// The content items of one named block on one page, ordered by the
/// binding's `sort` ascending. Ties keep a stable order (`created`, then
/// binding id), so repeated renders are deterministic.
pub fn page_block(store: &dyn ContentStore, page: &Page, block_name: &str) -> Vec<BlockItem> {
    let mut rows = store.page_content_items(page.id, block_name);
    rows.sort_by(|a, b| {
        (a.0.sort, a.0.created, a.0.id).cmp(&(b.0.sort, b.0.created, b.0.id))
    });
    rows.into_iter()
        .map(|(binding, item)| BlockItem { item, binding })
        .collect()
}

/// Look up a content item by its unique name.
///
/// When the item is missing and `auto_create_content_items` is on, an
/// empty item is created and returned so editors can fill it in later.
/// The create path is racy under concurrent identical lookups (first
/// insert wins); see [`Settings::auto_create_content_items`]. With
/// auto-creation off a miss returns `None` and the caller renders an
/// empty block.
pub fn named_item(
    store: &dyn ContentStore,
    settings: &Settings,
    name: &str,
) -> Option<ContentItem> {
    if let Some(item) = store.find_content_item(name) {
        return Some(item);
    }
    if settings.auto_create_content_items {
        debug!(name = %name, "auto-creating missing content item");
        return Some(store.create_content_item(name));
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::CreatePage;
    use crate::store::MemoryStore;

    fn test_page(store: &MemoryStore) -> Page {
        store.add_page(CreatePage {
            parent_id: None,
            title: "Main".to_string(),
            path: "/".to_string(),
            weight: None,
            show_in_menu: None,
            public: None,
        })
    }

    #[test]
    fn block_items_ordered_by_sort() {
        let store = MemoryStore::new();
        let page = test_page(&store);

        let last = ContentItem::empty("last");
        let first = ContentItem::empty("first");
        let middle = ContentItem::empty("middle");
        store.insert_content_item(last.clone());
        store.insert_content_item(first.clone());
        store.insert_content_item(middle.clone());
        store.attach(page.id, last.id, "main", 30);
        store.attach(page.id, first.id, "main", 10);
        store.attach(page.id, middle.id, "main", 20);

        let names: Vec<String> = page_block(&store, &page, "main")
            .into_iter()
            .map(|b| b.item.name)
            .collect();
        assert_eq!(names, vec!["first", "middle", "last"]);
    }

    #[test]
    fn sort_ties_are_stable() {
        let store = MemoryStore::new();
        let page = test_page(&store);

        let mut expected = Vec::new();
        for i in 0..5 {
            let item = ContentItem::empty(&format!("item-{i}"));
            store.insert_content_item(item.clone());
            let binding = store.attach(page.id, item.id, "main", 0);
            expected.push((binding.created, binding.id, item.name));
        }
        expected.sort();

        let first: Vec<String> = page_block(&store, &page, "main")
            .into_iter()
            .map(|b| b.item.name)
            .collect();
        let second: Vec<String> = page_block(&store, &page, "main")
            .into_iter()
            .map(|b| b.item.name)
            .collect();
        assert_eq!(first, second);
        let expected_names: Vec<String> = expected.into_iter().map(|(_, _, n)| n).collect();
        assert_eq!(first, expected_names);
    }

    #[test]
    fn blocks_are_scoped_by_name_and_page() {
        let store = MemoryStore::new();
        let page = test_page(&store);
        let other = test_page(&store);

        let item = ContentItem::empty("shared");
        store.insert_content_item(item.clone());
        store.attach(page.id, item.id, "main", 1);
        store.attach(other.id, item.id, "sidebar", 1);

        assert_eq!(page_block(&store, &page, "main").len(), 1);
        assert!(page_block(&store, &page, "sidebar").is_empty());
        assert!(page_block(&store, &other, "main").is_empty());
    }

    #[test]
    fn missing_item_without_auto_create_is_absent() {
        let store = MemoryStore::new();
        let settings = Settings::default();

        assert!(named_item(&store, &settings, "footer").is_none());
        // No store mutation on the miss path.
        assert_eq!(store.content_item_count(), 0);
    }

    #[test]
    fn missing_item_with_auto_create_is_created_empty() {
        let store = MemoryStore::new();
        let settings = Settings {
            auto_create_content_items: true,
            ..Settings::default()
        };

        let item = named_item(&store, &settings, "footer").unwrap();
        assert_eq!(item.name, "footer");
        assert!(item.html.is_empty());
        assert_eq!(store.content_item_count(), 1);

        // The second lookup finds the stored item instead of creating
        // another one.
        let again = named_item(&store, &settings, "footer").unwrap();
        assert_eq!(again.id, item.id);
        assert_eq!(store.content_item_count(), 1);
    }

    #[test]
    fn existing_item_is_returned_as_is() {
        let store = MemoryStore::new();
        let mut item = ContentItem::empty("footer");
        item.html = "<p>hi</p>".to_string();
        store.insert_content_item(item.clone());

        let found = named_item(&store, &Settings::default(), "footer").unwrap();
        assert_eq!(found, item);
    }
}
