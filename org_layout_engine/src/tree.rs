/// OrgChart Layout v1 - Tree Validation & Flattening
///
/// Converts a nested `OrgNode` tree into an index arena in pre-order.
/// Iterative traversal with an explicit stack; structural errors abort
/// before any geometry is computed.

use std::collections::BTreeSet;

use crate::domain::OrgNode;
use crate::error::{LayoutError, Result};

/// One node of the flattened arena.
#[derive(Debug)]
pub struct FlatNode<'a> {
    pub node: &'a OrgNode,
    pub depth: usize,
    pub parent: Option<usize>,
    /// Arena indices, left to right.
    pub children: Vec<usize>,
}

/// Pre-order arena. Index 0 is the root; every parent precedes its children.
#[derive(Debug)]
pub struct FlatTree<'a> {
    pub nodes: Vec<FlatNode<'a>>,
}

impl<'a> FlatTree<'a> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Arena indices grouped by depth, each row in left-to-right order.
    pub fn rows(&self) -> Vec<Vec<usize>> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); self.max_depth() + 1];
        // Pre-order visits each row left to right.
        for (idx, n) in self.nodes.iter().enumerate() {
            rows[n.depth].push(idx);
        }
        rows
    }

    /// `root -> ... -> node` as a readable id chain.
    fn path_to(&self, mut idx: usize) -> Vec<&'a str> {
        let mut path = vec![self.nodes[idx].node.id.as_str()];
        while let Some(p) = self.nodes[idx].parent {
            path.push(self.nodes[p].node.id.as_str());
            idx = p;
        }
        path.reverse();
        path
    }
}

/// Flatten and validate a tree.
///
/// Rejects:
///   - empty ids
///   - an id repeated on its own ancestor path (cycle)
///   - an id repeated anywhere else (duplicate)
///   - a declared `parent_id` that disagrees with the containing node
pub fn flatten(root: &OrgNode) -> Result<FlatTree<'_>> {
    let mut tree = FlatTree { nodes: Vec::new() };
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    // (node, parent index, depth)
    let mut stack: Vec<(&OrgNode, Option<usize>, usize)> = vec![(root, None, 0)];

    while let Some((node, parent, depth)) = stack.pop() {
        if node.id.is_empty() {
            return Err(LayoutError::EmptyId { depth });
        }

        if seen.contains(node.id.as_str()) {
            if let Some(p) = parent {
                let ancestors = tree.path_to(p);
                if ancestors.contains(&node.id.as_str()) {
                    let mut path = ancestors;
                    path.push(node.id.as_str());
                    return Err(LayoutError::Cycle {
                        id: node.id.clone(),
                        path: path.join(" -> "),
                    });
                }
            }
            return Err(LayoutError::DuplicateId {
                id: node.id.clone(),
            });
        }

        if let (Some(p), Some(declared)) = (parent, node.parent_id.as_deref()) {
            let actual = tree.nodes[p].node.id.as_str();
            if declared != actual {
                return Err(LayoutError::ParentMismatch {
                    id: node.id.clone(),
                    declared: declared.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        let idx = tree.nodes.len();
        seen.insert(node.id.as_str());
        tree.nodes.push(FlatNode {
            node,
            depth,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        if let Some(p) = parent {
            tree.nodes[p].children.push(idx);
        }

        // Reverse push so the leftmost child is visited first.
        for child in node.children.iter().rev() {
            stack.push((child, Some(idx), depth + 1));
        }
    }

    Ok(tree)
}

/// Structural check only; discards the arena.
pub fn validate_tree(root: &OrgNode) -> Result<()> {
    flatten(root).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeType;

    fn node(id: &str) -> OrgNode {
        OrgNode::new(id, id, NodeType::Department)
    }

    #[test]
    fn test_flatten_preorder_and_child_order() {
        let root = node("a")
            .with_child(node("b").with_child(node("d")))
            .with_child(node("c"));
        let tree = flatten(&root).unwrap();
        let ids: Vec<&str> = tree.nodes.iter().map(|n| n.node.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "d", "c"]);
        assert_eq!(tree.nodes[0].children, vec![1, 3]);
        assert_eq!(tree.nodes[2].depth, 2);
        assert_eq!(tree.rows(), vec![vec![0], vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_ancestor_repeated_as_child_is_cycle() {
        let root = node("a").with_child(node("b").with_child(node("a")));
        match flatten(&root) {
            Err(LayoutError::Cycle { id, path }) => {
                assert_eq!(id, "a");
                assert_eq!(path, "a -> b -> a");
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_as_child_is_cycle() {
        let mut root = node("a");
        root.children.push(node("a"));
        assert!(matches!(flatten(&root), Err(LayoutError::Cycle { .. })));
    }

    #[test]
    fn test_cousin_duplicate_is_duplicate_id() {
        let root = node("a")
            .with_child(node("b").with_child(node("x")))
            .with_child(node("c").with_child(node("x")));
        assert_eq!(
            flatten(&root).unwrap_err(),
            LayoutError::DuplicateId { id: "x".into() }
        );
    }

    #[test]
    fn test_parent_mismatch_rejected() {
        let mut child = node("b");
        child.parent_id = Some("zzz".into());
        let mut root = node("a");
        root.children.push(child);
        assert!(matches!(
            flatten(&root),
            Err(LayoutError::ParentMismatch { .. })
        ));
    }

    #[test]
    fn test_root_may_declare_external_parent() {
        let mut root = node("dept");
        root.parent_id = Some("division-9".into());
        assert!(validate_tree(&root).is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let root = node("a").with_child(node(""));
        assert_eq!(flatten(&root).unwrap_err(), LayoutError::EmptyId { depth: 1 });
    }
}
