// Element visibility with a manually-invalidated cache
// The rendered document tree lives on the UI side; the search pass only
// needs yes/no verdicts, so the tree is abstracted behind a trait and
// elements are referred to by caller-assigned stable ids. The cache holds
// ids only and never keeps an element alive.

use std::collections::HashMap;

/// Stable identity of one element in the rendered document tree,
/// assigned by the UI collaborator.
pub type NodeId = u64;

/// The questions the visibility check asks of the UI collaborator.
pub trait ElementTree {
    /// Parent element, `None` at (or above) the top of the tree.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Whether this element is the document root.
    fn is_root(&self, node: NodeId) -> bool;
    /// Non-rendering style container, never visible.
    fn is_style_container(&self, node: NodeId) -> bool;
    /// Carries the force-hidden marker class.
    fn is_marked_hidden(&self, node: NodeId) -> bool;
    /// The platform's native visibility check (display and opacity),
    /// `None` where the platform does not support it.
    fn self_visibility(&self, node: NodeId) -> Option<bool>;
    /// Fallback: computed display/visibility style hides the element.
    fn is_style_hidden(&self, node: NodeId) -> bool;
}

/// Cached visibility verdicts. The cache has no expiry and no partial
/// invalidation: the owner must call [`clear_cache`](Self::clear_cache)
/// before any pass that could observe a changed tree.
pub struct VisibilityIndex {
    cache: HashMap<NodeId, bool>,
}

impl VisibilityIndex {
    pub fn new() -> Self {
        VisibilityIndex {
            cache: HashMap::new(),
        }
    }

    /// Drop every cached verdict.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Whether `element` and every ancestor up to the root is visible.
    ///
    /// `None` is not visible. The root is visible by definition. A style
    /// container or force-hidden element is invisible before any cache
    /// lookup. Otherwise the native check decides local visibility (the
    /// computed-style fallback when unsupported), and a locally visible
    /// element defers to its ancestor chain; a chain that ends without
    /// reaching the root counts as detached, not visible.
    ///
    /// The ascent is an explicit loop, since nesting depth is document-
    /// dependent and unbounded. Every verdict computed on the way is
    /// memoized before returning.
    pub fn is_element_visible(&mut self, tree: &impl ElementTree, element: Option<NodeId>) -> bool {
        let Some(start) = element else {
            return false;
        };

        let mut path: Vec<NodeId> = Vec::new();
        let mut current = Some(start);

        let verdict = loop {
            let Some(node) = current else {
                // Walked off the top without meeting the root
                break false;
            };
            if tree.is_root(node) {
                break true;
            }
            if tree.is_style_container(node) || tree.is_marked_hidden(node) {
                path.push(node);
                break false;
            }
            if let Some(&cached) = self.cache.get(&node) {
                break cached;
            }

            let locally_visible = match tree.self_visibility(node) {
                Some(visible) => visible,
                None => !tree.is_style_hidden(node),
            };
            path.push(node);
            if !locally_visible {
                break false;
            }
            current = tree.parent(node);
        };

        for node in path {
            self.cache.insert(node, verdict);
        }
        verdict
    }
}

impl Default for VisibilityIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default, Clone)]
    struct TestNode {
        parent: Option<NodeId>,
        root: bool,
        style_container: bool,
        marked_hidden: bool,
        self_visibility: Option<bool>,
        style_hidden: bool,
    }

    #[derive(Default)]
    struct TestTree {
        nodes: Vec<TestNode>,
        probe_count: Cell<usize>,
    }

    impl TestTree {
        fn with_root() -> Self {
            let mut tree = TestTree::default();
            tree.nodes.push(TestNode {
                root: true,
                ..Default::default()
            });
            tree
        }

        fn add_child(&mut self, parent: NodeId, node: TestNode) -> NodeId {
            let id = self.nodes.len() as NodeId;
            self.nodes.push(TestNode {
                parent: Some(parent),
                ..node
            });
            id
        }

        fn visible_child(&mut self, parent: NodeId) -> NodeId {
            self.add_child(
                parent,
                TestNode {
                    self_visibility: Some(true),
                    ..Default::default()
                },
            )
        }

        fn node(&self, id: NodeId) -> &TestNode {
            &self.nodes[id as usize]
        }
    }

    impl ElementTree for TestTree {
        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.node(node).parent
        }
        fn is_root(&self, node: NodeId) -> bool {
            self.node(node).root
        }
        fn is_style_container(&self, node: NodeId) -> bool {
            self.node(node).style_container
        }
        fn is_marked_hidden(&self, node: NodeId) -> bool {
            self.node(node).marked_hidden
        }
        fn self_visibility(&self, node: NodeId) -> Option<bool> {
            self.probe_count.set(self.probe_count.get() + 1);
            self.node(node).self_visibility
        }
        fn is_style_hidden(&self, node: NodeId) -> bool {
            self.node(node).style_hidden
        }
    }

    #[test]
    fn test_none_is_not_visible() {
        let tree = TestTree::with_root();
        let mut index = VisibilityIndex::new();
        assert!(!index.is_element_visible(&tree, None));
    }

    #[test]
    fn test_root_is_visible() {
        let tree = TestTree::with_root();
        let mut index = VisibilityIndex::new();
        assert!(index.is_element_visible(&tree, Some(0)));
    }

    #[test]
    fn test_visible_chain() {
        let mut tree = TestTree::with_root();
        let a = tree.visible_child(0);
        let b = tree.visible_child(a);
        let mut index = VisibilityIndex::new();
        assert!(index.is_element_visible(&tree, Some(b)));
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let mut tree = TestTree::with_root();
        let hidden = tree.add_child(
            0,
            TestNode {
                self_visibility: Some(false),
                ..Default::default()
            },
        );
        let child = tree.visible_child(hidden);
        let grandchild = tree.visible_child(child);
        let mut index = VisibilityIndex::new();
        assert!(!index.is_element_visible(&tree, Some(grandchild)));
        assert!(!index.is_element_visible(&tree, Some(hidden)));
    }

    #[test]
    fn test_style_container_is_never_visible() {
        let mut tree = TestTree::with_root();
        let style = tree.add_child(
            0,
            TestNode {
                style_container: true,
                self_visibility: Some(true),
                ..Default::default()
            },
        );
        let mut index = VisibilityIndex::new();
        assert!(!index.is_element_visible(&tree, Some(style)));
    }

    #[test]
    fn test_marker_class_is_never_visible() {
        let mut tree = TestTree::with_root();
        let marked = tree.add_child(
            0,
            TestNode {
                marked_hidden: true,
                self_visibility: Some(true),
                ..Default::default()
            },
        );
        let mut index = VisibilityIndex::new();
        assert!(!index.is_element_visible(&tree, Some(marked)));
    }

    #[test]
    fn test_style_fallback_when_native_check_unsupported() {
        let mut tree = TestTree::with_root();
        let shown = tree.add_child(
            0,
            TestNode {
                self_visibility: None,
                style_hidden: false,
                ..Default::default()
            },
        );
        let hidden = tree.add_child(
            0,
            TestNode {
                self_visibility: None,
                style_hidden: true,
                ..Default::default()
            },
        );
        let mut index = VisibilityIndex::new();
        assert!(index.is_element_visible(&tree, Some(shown)));
        assert!(!index.is_element_visible(&tree, Some(hidden)));
    }

    #[test]
    fn test_detached_chain_is_not_visible() {
        let mut tree = TestTree::default();
        // No root anywhere above this node
        tree.nodes.push(TestNode {
            self_visibility: Some(true),
            ..Default::default()
        });
        let mut index = VisibilityIndex::new();
        assert!(!index.is_element_visible(&tree, Some(0)));
    }

    #[test]
    fn test_repeated_calls_are_cached_and_coherent() {
        let mut tree = TestTree::with_root();
        let a = tree.visible_child(0);
        let b = tree.visible_child(a);
        let mut index = VisibilityIndex::new();

        let first = index.is_element_visible(&tree, Some(b));
        let probes = tree.probe_count.get();
        let second = index.is_element_visible(&tree, Some(b));
        assert_eq!(first, second);
        // The second call is answered from the cache
        assert_eq!(tree.probe_count.get(), probes);
    }

    #[test]
    fn test_ancestor_verdicts_are_memoized_along_the_path() {
        let mut tree = TestTree::with_root();
        let a = tree.visible_child(0);
        let b = tree.visible_child(a);
        let c = tree.visible_child(b);
        let mut index = VisibilityIndex::new();

        assert!(index.is_element_visible(&tree, Some(c)));
        let probes = tree.probe_count.get();
        // Sibling lookups stop at the already-cached ancestor
        let d = tree.visible_child(b);
        assert!(index.is_element_visible(&tree, Some(d)));
        assert_eq!(tree.probe_count.get(), probes + 1);
    }

    #[test]
    fn test_clear_cache_picks_up_changes() {
        let mut tree = TestTree::with_root();
        let a = tree.visible_child(0);
        let mut index = VisibilityIndex::new();
        assert!(index.is_element_visible(&tree, Some(a)));

        tree.nodes[a as usize].self_visibility = Some(false);
        // Stale until the owner clears
        assert!(index.is_element_visible(&tree, Some(a)));
        index.clear_cache();
        assert!(!index.is_element_visible(&tree, Some(a)));
    }

    #[test]
    fn test_deep_nesting() {
        let mut tree = TestTree::with_root();
        let mut node = 0;
        for _ in 0..100_000 {
            node = tree.visible_child(node);
        }
        let mut index = VisibilityIndex::new();
        assert!(index.is_element_visible(&tree, Some(node)));
    }
}
