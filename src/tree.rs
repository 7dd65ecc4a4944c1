//! Nested-set index over the page forest.
//!
//! Stored pages carry only parent pointers and sibling weights; this
//! module derives depth and nested-set intervals (`lft`/`rght`) at
//! indexing time. For any node, every descendant's interval lies strictly
//! inside the node's own interval, and sibling intervals are disjoint,
//! which lets menu selection answer ancestor/descendant/sibling queries
//! with plain interval comparisons.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Page;

/// One indexed page.
#[derive(Debug, Clone)]
pub struct NavNode {
    /// The page record.
    pub page: Page,
    /// Depth in its tree (root = 0).
    pub level: u32,
    /// Nested-set left bound.
    pub lft: u64,
    /// Nested-set right bound.
    pub rght: u64,
    /// Which root's tree this node belongs to.
    pub tree_id: u32,
    /// Index of the parent node, if any.
    pub(crate) parent: Option<usize>,
}

impl NavNode {
    /// Whether this node is a strict descendant of `other`.
    pub fn strictly_inside(&self, other: &NavNode) -> bool {
        self.tree_id == other.tree_id && self.lft > other.lft && self.rght < other.rght
    }
}

/// Indexed page forest. Nodes are held in depth-first (pre-order) order,
/// so filtering preserves render order without re-sorting.
#[derive(Debug, Default)]
pub struct NavTree {
    nodes: Vec<NavNode>,
    by_id: HashMap<Uuid, usize>,
}

impl NavTree {
    /// Index a set of page records into a forest.
    ///
    /// Pages whose parent is missing from the input (or unreachable from
    /// any root, e.g. via a parent cycle) are dropped with a warning.
    pub fn index(pages: Vec<Page>) -> Self {
        let known: HashSet<Uuid> = pages.iter().map(|p| p.id).collect();

        let mut pending: HashMap<Option<Uuid>, Vec<Page>> = HashMap::new();
        for page in pages {
            match page.parent_id {
                Some(parent_id) if !known.contains(&parent_id) => {
                    warn!(page = %page.id, parent = %parent_id, "dropping page with unknown parent");
                }
                key => pending.entry(key).or_default().push(page),
            }
        }
        for siblings in pending.values_mut() {
            siblings.sort_by(|a, b| {
                (a.weight, a.created, a.id).cmp(&(b.weight, b.created, b.id))
            });
        }

        let mut tree = Self::default();
        let roots = pending.remove(&None).unwrap_or_default();
        let tree_count = roots.len();
        for (tree_id, root) in roots.into_iter().enumerate() {
            let mut counter = 1;
            tree.attach(root, None, 0, tree_id as u32, &mut counter, &mut pending);
        }

        for orphans in pending.values() {
            for page in orphans {
                warn!(page = %page.id, "dropping page unreachable from any root");
            }
        }

        debug!(nodes = tree.nodes.len(), trees = tree_count, "indexed page forest");
        tree
    }

    fn attach(
        &mut self,
        page: Page,
        parent: Option<usize>,
        level: u32,
        tree_id: u32,
        counter: &mut u64,
        pending: &mut HashMap<Option<Uuid>, Vec<Page>>,
    ) {
        let idx = self.nodes.len();
        let id = page.id;
        self.by_id.insert(id, idx);
        self.nodes.push(NavNode {
            page,
            level,
            lft: *counter,
            rght: 0,
            tree_id,
            parent,
        });
        *counter += 1;

        for child in pending.remove(&Some(id)).unwrap_or_default() {
            self.attach(child, Some(idx), level + 1, tree_id, counter, pending);
        }

        self.nodes[idx].rght = *counter;
        *counter += 1;
    }

    /// Look up a node by page id.
    pub fn get(&self, id: Uuid) -> Option<&NavNode> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Parent node, if any.
    pub fn parent(&self, node: &NavNode) -> Option<&NavNode> {
        node.parent.map(|idx| &self.nodes[idx])
    }

    /// Find a tree root by page title.
    pub fn root_by_title(&self, title: &str) -> Option<&NavNode> {
        self.nodes
            .iter()
            .find(|n| n.level == 0 && n.page.title == title)
    }

    /// The subtree rooted at `root` (inclusive), bounded by `max_level`,
    /// in pre-order.
    pub fn subtree(&self, root: &NavNode, max_level: u32) -> Vec<&NavNode> {
        self.nodes
            .iter()
            .filter(|n| {
                n.tree_id == root.tree_id
                    && n.lft >= root.lft
                    && n.rght <= root.rght
                    && n.level <= max_level
            })
            .collect()
    }

    /// All nodes of one tree with `level <= max_level`, in pre-order.
    pub fn tree_nodes(&self, tree_id: u32, max_level: u32) -> Vec<&NavNode> {
        self.nodes
            .iter()
            .filter(|n| n.tree_id == tree_id && n.level <= max_level)
            .collect()
    }

    /// All indexed nodes in pre-order.
    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
