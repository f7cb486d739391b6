// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Pre-order traversal over an arena tree.
//!
//! [`NodeIter`] does not borrow the tree between steps, so a caller may
//! mutate the tree after each yielded node. Children of a node are scheduled
//! lazily when the walker advances past it, which lets the caller suppress
//! them ([`NodeIter::skip_children`]) or swap the node for a replacement
//! whose children should be walked instead ([`NodeIter::replace_current`]).

use std::collections::HashSet;

use tracing::trace;

use crate::nodes::{NodeId, NodeKind, Tree};

/// A lazy, non-restartable, depth-first pre-order walk.
#[derive(Debug, Clone)]
pub struct NodeIter {
    stack: Vec<NodeId>,
    prev: Option<NodeId>,
    skip_kinds: HashSet<NodeKind>,
}

impl NodeIter {
    pub fn new(root: NodeId) -> Self {
        Self {
            stack: vec![root],
            prev: None,
            skip_kinds: HashSet::new(),
        }
    }

    /// Nodes of these kinds are yielded, but their children never are.
    pub fn with_skip_kinds(root: NodeId, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            skip_kinds: kinds.into_iter().collect(),
            ..Self::new(root)
        }
    }

    /// Do not descend into the node yielded last.
    pub fn skip_children(&mut self) {
        self.prev = None;
    }

    /// Descend into `node` instead of the node yielded last.
    pub fn replace_current(&mut self, node: NodeId) {
        if self.prev.is_some() {
            self.prev = Some(node);
        }
    }

    /// Yield the next node in pre-order.
    ///
    /// Ids that are unknown to `tree` are treated as leaves.
    pub fn advance(&mut self, tree: &Tree) -> Option<NodeId> {
        if let Some(prev) = self.prev.take() {
            let descend = tree
                .kind(prev)
                .is_some_and(|kind| !self.skip_kinds.contains(&kind));
            if descend {
                self.stack.extend(tree.children(prev).into_iter().rev());
            }
        }
        let next = self.stack.pop()?;
        trace!(node = %next, "walk");
        self.prev = Some(next);
        Some(next)
    }
}

/// Read-only pre-order iterator.
pub struct Walk<'t> {
    tree: &'t Tree,
    iter: NodeIter,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.iter.advance(self.tree)
    }
}

/// Iterate the subtree at `root` in document order.
pub fn walk(tree: &Tree, root: NodeId) -> Walk<'_> {
    Walk {
        tree,
        iter: NodeIter::new(root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Node;
    use crate::parse_module;

    fn names(tree: &Tree, ids: impl IntoIterator<Item = NodeId>) -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| match tree.node(id) {
                Node::Name { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn walks_in_document_order() {
        let tree = parse_module("a = b + c\nd(e, f=g)\n").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(
            names(&tree, walk(&tree, root)),
            vec!["a", "b", "c", "d", "e", "g"]
        );
    }

    #[test]
    fn skip_children_prunes_subtree() {
        let tree = parse_module("a = b + c\nd = e\n").unwrap();
        let root = tree.root().unwrap();
        let mut iter = NodeIter::new(root);
        let mut seen = Vec::new();
        while let Some(id) = iter.advance(&tree) {
            if matches!(tree.node(id), Node::BinOp { .. }) {
                iter.skip_children();
            }
            seen.push(id);
        }
        assert_eq!(names(&tree, seen), vec!["a", "d", "e"]);
    }

    #[test]
    fn skip_kinds_are_leaves() {
        let tree = parse_module("a = f(b)\n").unwrap();
        let root = tree.root().unwrap();
        let mut iter = NodeIter::with_skip_kinds(root, [NodeKind::Call]);
        let mut seen = Vec::new();
        while let Some(id) = iter.advance(&tree) {
            seen.push(id);
        }
        assert!(seen.iter().any(|id| tree.kind(*id) == Some(NodeKind::Call)));
        assert_eq!(names(&tree, seen), vec!["a"]);
    }

    #[test]
    fn replace_current_walks_the_replacement() {
        let mut tree = parse_module("a = b\n").unwrap();
        let root = tree.root().unwrap();
        let mut iter = NodeIter::new(root);
        let mut seen = Vec::new();
        while let Some(id) = iter.advance(&tree) {
            if let Node::Name { id: name } = tree.node(id) {
                if name == "b" {
                    let inner = tree.alloc(Node::Name { id: "x".into() });
                    let call = tree.alloc(Node::Call {
                        func: inner,
                        args: vec![],
                    });
                    iter.replace_current(call);
                }
            }
            seen.push(id);
        }
        assert_eq!(names(&tree, seen), vec!["a", "b", "x"]);
    }

    #[test]
    fn unknown_root_is_a_leaf() {
        let tree = Tree::new();
        let mut iter = NodeIter::new(NodeId(9));
        assert_eq!(iter.advance(&tree), Some(NodeId(9)));
        assert_eq!(iter.advance(&tree), None);
    }
}
