//! Menu selection: which tree nodes are needed to render a menu.
//!
//! Given a menu root (a top-level page identified by title), depth
//! bounds, an expansion mode, and the currently viewed page, selection
//! computes the minimal node set for a navigation menu: the route to the
//! current page stays visible, siblings of everything on that route stay
//! visible so drilling down never removes items already shown, and the
//! current page's children are revealed.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::access::AccessPolicy;
use crate::error::{Error, Result};
use crate::models::{Page, User};
use crate::tree::{NavNode, NavTree};

/// Menu expansion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expand {
    /// Expand only around the current page.
    #[default]
    None,
    /// Expand the whole tree down to the maximum level.
    All,
    /// Expand all descendants of the current page, not just its
    /// immediate children.
    AllDescendants,
}

impl Expand {
    /// Parse the optional `expand` tag argument.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None | Some("") => Ok(Self::None),
            Some("all") => Ok(Self::All),
            Some("all_descendants") => Ok(Self::AllDescendants),
            Some(other) => Err(Error::InvalidUsage(format!(
                "unknown expand mode '{other}' (expected 'all' or 'all_descendants')"
            ))),
        }
    }

    /// The tag-argument spelling of this mode, if any.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::All => Some("all"),
            Self::AllDescendants => Some("all_descendants"),
        }
    }
}

/// Arguments of one menu render.
#[derive(Debug, Clone)]
pub struct MenuParams {
    /// Title of the top-level page whose tree is rendered.
    pub menu_name: String,
    /// Minimum level to render (root = 0, so a site-wide menu uses 1).
    pub min_level: u32,
    /// Maximum level to render.
    pub max_level: u32,
    /// Expansion mode.
    pub expand: Expand,
}

impl MenuParams {
    /// Menu params with no expansion.
    pub fn new(menu_name: &str, min_level: u32, max_level: u32) -> Self {
        Self {
            menu_name: menu_name.to_string(),
            min_level,
            max_level,
            expand: Expand::None,
        }
    }

    /// Set the expansion mode.
    pub fn with_expand(mut self, expand: Expand) -> Self {
        self.expand = expand;
        self
    }
}

/// One selected menu entry, in render order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    /// The page to render.
    pub page: Page,
    /// Its depth in the menu tree.
    pub level: u32,
}

/// Result of menu selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSelection {
    /// Selected pages in pre-order (`lft` ascending).
    pub entries: Vec<MenuEntry>,
    /// The page relative URLs hang off: parent of the first entry, the
    /// menu root when nothing was selected for a first-level menu, or
    /// nothing.
    pub parent: Option<Page>,
}

/// Select the pages needed to render a menu.
///
/// Fails with [`Error::MenuNotFound`] when no top-level page carries the
/// menu name.
pub fn select(
    tree: &NavTree,
    params: &MenuParams,
    current: Option<&Page>,
    user: &User,
    policy: &dyn AccessPolicy,
) -> Result<MenuSelection> {
    let root = tree
        .root_by_title(&params.menu_name)
        .ok_or_else(|| Error::MenuNotFound {
            menu: params.menu_name.clone(),
        })?;

    // The root itself never counts as "inside" its own menu.
    let current = current
        .and_then(|page| tree.get(page.id))
        .filter(|node| node.strictly_inside(root));

    let needed = match current {
        Some(cur) => for_current_page(tree, params, root, cur),
        None => {
            // Only menus starting at the first level render without a
            // current page in the tree.
            if params.min_level == 1 {
                match params.expand {
                    Expand::None => tree.tree_nodes(root.tree_id, 1),
                    Expand::All => tree.tree_nodes(root.tree_id, params.max_level),
                    Expand::AllDescendants => Vec::new(),
                }
            } else {
                Vec::new()
            }
        }
    };

    let mut visible: Vec<&NavNode> = needed
        .into_iter()
        .filter(|n| n.level >= params.min_level)
        .filter(|n| n.page.show_in_menu && policy.can_view(user, &n.page))
        .collect();
    visible.sort_by_key(|n| n.lft);

    let parent = match visible.first() {
        Some(first) => tree.parent(first).map(|p| p.page.clone()),
        None if params.min_level == 1 => Some(root.page.clone()),
        None => None,
    };

    debug!(
        menu = %params.menu_name,
        selected = visible.len(),
        "selected menu pages"
    );

    let entries = visible
        .into_iter()
        .map(|n| MenuEntry {
            page: n.page.clone(),
            level: n.level,
        })
        .collect();

    Ok(MenuSelection { entries, parent })
}

/// Selection when the current page sits inside the menu tree: the route
/// to the current page, siblings of every route node, and the current
/// page's children, all within the level-bounded subtree.
fn for_current_page<'t>(
    tree: &'t NavTree,
    params: &MenuParams,
    root: &'t NavNode,
    cur: &'t NavNode,
) -> Vec<&'t NavNode> {
    let scope = tree.subtree(root, params.max_level);

    if params.expand == Expand::All {
        return scope;
    }
    if cur.level + 1 < params.min_level {
        // Everything around the current page falls below the minimum
        // level; nothing to show.
        return Vec::new();
    }

    // Dedup the union and keep it ordered by lft.
    let mut needed: BTreeMap<u64, &NavNode> = BTreeMap::new();

    // Route: strict ancestors of the current page.
    for n in &scope {
        if n.lft < cur.lft && n.rght > cur.rght {
            needed.insert(n.lft, *n);
        }
    }

    // Route siblings: for every node on the route (current page
    // included), everything at its level inside its parent's interval.
    // Items shown before drilling down must not disappear.
    let mut p = cur;
    while let Some(parent) = tree.parent(p) {
        for n in &scope {
            if n.level == p.level && n.lft > parent.lft && n.rght < parent.rght {
                needed.insert(n.lft, *n);
            }
        }
        p = parent;
    }

    // Children of the current page; immediate only unless expanding all
    // descendants.
    for n in &scope {
        if n.lft > cur.lft
            && n.rght < cur.rght
            && (params.expand == Expand::AllDescendants || n.level == cur.level + 1)
        {
            needed.insert(n.lft, *n);
        }
    }

    needed.into_values().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::access::DefaultPolicy;
    use crate::models::CreatePage;

    struct Fixture {
        tree: NavTree,
        main: Page,
        a: Page,
        a1: Page,
        a1a: Page,
        a1a1: Page,
        a1b: Page,
        a2: Page,
        b: Page,
        b1: Page,
        footer: Page,
    }

    fn page(title: &str, parent: Option<&Page>, weight: i32) -> Page {
        Page::new(CreatePage {
            parent_id: parent.map(|p| p.id),
            title: title.to_string(),
            path: format!("/{}", title.to_lowercase()),
            weight: Some(weight),
            show_in_menu: None,
            public: None,
        })
    }

    /// Main            (level 0)
    ///   A             (level 1)
    ///     A1          (level 2)
    ///       A1a       (level 3, the usual "current" page)
    ///         A1a1    (level 4)
    ///       A1b       (level 3)
    ///     A2          (level 2)
    ///   B             (level 1)
    ///     B1          (level 2)
    /// Footer          (level 0, separate tree)
    fn fixture() -> Fixture {
        let main = page("Main", None, 0);
        let a = page("A", Some(&main), 10);
        let a1 = page("A1", Some(&a), 0);
        let a1a = page("A1a", Some(&a1), 0);
        let a1a1 = page("A1a1", Some(&a1a), 0);
        let a1b = page("A1b", Some(&a1), 10);
        let a2 = page("A2", Some(&a), 20);
        let b = page("B", Some(&main), 20);
        let b1 = page("B1", Some(&b), 0);
        let footer = page("Footer", None, 100);

        let tree = NavTree::index(vec![
            main.clone(),
            a.clone(),
            a1.clone(),
            a1a.clone(),
            a1a1.clone(),
            a1b.clone(),
            a2.clone(),
            b.clone(),
            b1.clone(),
            footer.clone(),
        ]);
        Fixture {
            tree,
            main,
            a,
            a1,
            a1a,
            a1a1,
            a1b,
            a2,
            b,
            b1,
            footer,
        }
    }

    fn titles(selection: &MenuSelection) -> Vec<&str> {
        selection
            .entries
            .iter()
            .map(|e| e.page.title.as_str())
            .collect()
    }

    fn select_main(
        fx: &Fixture,
        params: &MenuParams,
        current: Option<&Page>,
    ) -> Result<MenuSelection> {
        select(
            &fx.tree,
            params,
            current,
            &User::anonymous(),
            &DefaultPolicy,
        )
    }

    #[test]
    fn missing_menu_root_is_not_found() {
        let fx = fixture();
        let err = select_main(&fx, &MenuParams::new("Nope", 1, 999), None).unwrap_err();
        assert!(matches!(err, Error::MenuNotFound { .. }));
        assert!(err.to_string().contains("'Nope'"));
    }

    #[test]
    fn no_current_page_shows_first_level() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), None).unwrap();
        assert_eq!(titles(&selection), vec!["A", "B"]);
        assert_eq!(selection.parent.as_ref().unwrap().id, fx.main.id);
    }

    #[test]
    fn no_current_page_expand_all_shows_bounded_tree() {
        let fx = fixture();
        let params = MenuParams::new("Main", 1, 2).with_expand(Expand::All);
        let selection = select_main(&fx, &params, None).unwrap();
        assert_eq!(titles(&selection), vec!["A", "A1", "A2", "B", "B1"]);
    }

    #[test]
    fn no_current_page_above_first_level_is_empty() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 2, 999), None).unwrap();
        assert!(selection.entries.is_empty());
        assert!(selection.parent.is_none());
    }

    #[test]
    fn current_page_outside_tree_behaves_like_none() {
        let fx = fixture();
        let selection =
            select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.footer)).unwrap();
        assert_eq!(titles(&selection), vec!["A", "B"]);
    }

    #[test]
    fn current_page_equal_to_root_behaves_like_none() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.main)).unwrap();
        assert_eq!(titles(&selection), vec!["A", "B"]);
    }

    #[test]
    fn current_page_selects_route_siblings_and_children() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.a1a)).unwrap();
        // Route: A, A1. Siblings per route level: {A1a, A1b}, {A1, A2},
        // {A, B}. Children of A1a: A1a1. B1 stays hidden.
        assert_eq!(
            titles(&selection),
            vec!["A", "A1", "A1a", "A1a1", "A1b", "A2", "B"]
        );
        assert_eq!(selection.parent.as_ref().unwrap().id, fx.main.id);
    }

    #[test]
    fn selection_is_idempotent() {
        let fx = fixture();
        let params = MenuParams::new("Main", 1, 999);
        let first = select_main(&fx, &params, Some(&fx.a1a)).unwrap();
        let second = select_main(&fx, &params, Some(&fx.a1a)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn immediate_children_only_without_descendant_expansion() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.a1)).unwrap();
        // Children of A1 stop at A1a/A1b; A1a1 needs all_descendants.
        assert_eq!(titles(&selection), vec!["A", "A1", "A1a", "A1b", "A2", "B"]);

        let params = MenuParams::new("Main", 1, 999).with_expand(Expand::AllDescendants);
        let selection = select_main(&fx, &params, Some(&fx.a1)).unwrap();
        assert_eq!(
            titles(&selection),
            vec!["A", "A1", "A1a", "A1a1", "A1b", "A2", "B"]
        );
    }

    #[test]
    fn expand_all_with_current_page_takes_whole_subtree() {
        let fx = fixture();
        let params = MenuParams::new("Main", 1, 2).with_expand(Expand::All);
        let selection = select_main(&fx, &params, Some(&fx.a1a)).unwrap();
        assert_eq!(titles(&selection), vec!["A", "A1", "A2", "B", "B1"]);
    }

    #[test]
    fn max_level_bounds_children() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 3), Some(&fx.a1a)).unwrap();
        // A1a1 (level 4) is beyond max_level.
        assert_eq!(
            titles(&selection),
            vec!["A", "A1", "A1a", "A1b", "A2", "B"]
        );
    }

    #[test]
    fn min_level_trims_the_route() {
        let fx = fixture();
        let selection = select_main(&fx, &MenuParams::new("Main", 2, 999), Some(&fx.a1a)).unwrap();
        assert_eq!(titles(&selection), vec!["A1", "A1a", "A1a1", "A1b", "A2"]);
        // Parent of the first remaining node (A1) is A.
        assert_eq!(selection.parent.as_ref().unwrap().id, fx.a.id);
    }

    #[test]
    fn min_level_above_children_short_circuits() {
        let fx = fixture();
        // current.level + 1 == 4 < 5: nothing to show.
        let selection = select_main(&fx, &MenuParams::new("Main", 5, 999), Some(&fx.a1a)).unwrap();
        assert!(selection.entries.is_empty());
        assert!(selection.parent.is_none());
    }

    #[test]
    fn hidden_page_is_filtered_but_selection_survives() {
        let mut fx = fixture();
        fx.a2.show_in_menu = false;
        fx.tree = NavTree::index(vec![
            fx.main.clone(),
            fx.a.clone(),
            fx.a1.clone(),
            fx.a1a.clone(),
            fx.a1a1.clone(),
            fx.a1b.clone(),
            fx.a2.clone(),
            fx.b.clone(),
            fx.b1.clone(),
        ]);
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.a1a)).unwrap();
        // A2 disappears; the walk through its level is otherwise intact.
        assert_eq!(
            titles(&selection),
            vec!["A", "A1", "A1a", "A1a1", "A1b", "B"]
        );
    }

    #[test]
    fn hidden_route_node_disappears_without_breaking_the_walk() {
        let mut fx = fixture();
        // Hide A1, an ancestor of the current page.
        fx.a1.show_in_menu = false;
        fx.tree = NavTree::index(vec![
            fx.main.clone(),
            fx.a.clone(),
            fx.a1.clone(),
            fx.a1a.clone(),
            fx.a1a1.clone(),
            fx.a1b.clone(),
            fx.a2.clone(),
            fx.b.clone(),
            fx.b1.clone(),
        ]);
        let selection = select_main(&fx, &MenuParams::new("Main", 1, 999), Some(&fx.a1a)).unwrap();
        // Only A1 itself disappears: the sibling walk still passes
        // through it, so its level-mates (A2) and the levels above and
        // below stay intact.
        assert_eq!(
            titles(&selection),
            vec!["A", "A1a", "A1a1", "A1b", "A2", "B"]
        );
    }

    #[test]
    fn non_public_page_hidden_from_anonymous_only() {
        let mut fx = fixture();
        fx.b.public = false;
        fx.tree = NavTree::index(vec![
            fx.main.clone(),
            fx.a.clone(),
            fx.b.clone(),
            fx.b1.clone(),
        ]);
        let params = MenuParams::new("Main", 1, 999);

        let anon = select(
            &fx.tree,
            &params,
            None,
            &User::anonymous(),
            &DefaultPolicy,
        )
        .unwrap();
        assert_eq!(titles(&anon), vec!["A"]);

        let member = select(
            &fx.tree,
            &params,
            None,
            &User::new("alice", false),
            &DefaultPolicy,
        )
        .unwrap();
        assert_eq!(titles(&member), vec!["A", "B"]);
    }

    #[test]
    fn empty_first_level_menu_falls_back_to_root_parent() {
        let main = page("Main", None, 0);
        let mut hidden = page("A", Some(&main), 0);
        hidden.show_in_menu = false;
        let tree = NavTree::index(vec![main.clone(), hidden]);

        let selection = select(
            &tree,
            &MenuParams::new("Main", 1, 999),
            None,
            &User::anonymous(),
            &DefaultPolicy,
        )
        .unwrap();
        assert!(selection.entries.is_empty());
        assert_eq!(selection.parent.as_ref().unwrap().id, main.id);
    }

    #[test]
    fn expand_parse() {
        assert_eq!(Expand::parse(None).unwrap(), Expand::None);
        assert_eq!(Expand::parse(Some("")).unwrap(), Expand::None);
        assert_eq!(Expand::parse(Some("all")).unwrap(), Expand::All);
        assert_eq!(
            Expand::parse(Some("all_descendants")).unwrap(),
            Expand::AllDescendants
        );
        assert!(matches!(
            Expand::parse(Some("sideways")),
            Err(Error::InvalidUsage(_))
        ));
    }
}
