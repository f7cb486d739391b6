// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arena-backed syntax tree.
//!
//! Every node lives in a single [`Tree`] and is addressed by a [`NodeId`].
//! Children are stored as ids inside the parent's [`Node`] payload; the parent
//! back-link is a plain `Option<NodeId>` filled in by [`Tree::link_parents`]
//! and kept current by the mutation helpers below. Nodes detached by a
//! rewrite stay in the arena but are no longer reachable from the root.

mod node;
pub mod op;

use std::collections::HashMap;
use std::fmt;

use slipform_core::span::Span;
use thiserror::Error;

pub use node::{ConstantKind, Node, NodeKind, ParamKind};
pub use op::{BinaryOp, BoolOp, CompOp, UnaryOp};

use node::{Slot, SlotMut};

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from structural tree edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {0} has no parent")]
    Detached(NodeId),

    #[error("{child} is held in a required slot of {kind} {parent} and cannot be removed")]
    RequiredSlot {
        parent: NodeId,
        kind: NodeKind,
        child: NodeId,
    },

    #[error("{child} is held in a single-child slot of {kind} {parent}; cannot splice {count} nodes")]
    NotAList {
        parent: NodeId,
        kind: NodeKind,
        child: NodeId,
        count: usize,
    },

    #[error("{kind} {node} has no statement list")]
    NotABlock { node: NodeId, kind: NodeKind },
}

#[derive(Debug, Clone)]
struct NodeData {
    node: Node,
    parent: Option<NodeId>,
    span: Option<Span>,
}

/// An arena of syntax nodes.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
    trailing_comments: HashMap<NodeId, String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Add a detached node without a source span.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.push(node, None)
    }

    /// Add a detached node carrying its source span.
    pub fn alloc_spanned(&mut self, node: Node, span: Span) -> NodeId {
        self.push(node, Some(span))
    }

    fn push(&mut self, node: Node, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            node,
            parent: None,
            span,
        });
        id
    }

    /// Discard every node allocated at or after `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        self.trailing_comments.retain(|id, _| id.index() < len);
        if self.root.is_some_and(|root| root.index() >= len) {
            self.root = None;
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).map(|data| &data.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).map(|data| &mut data.node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// The node for an id minted by this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()].node
    }

    /// Mutable access to a node minted by this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()].node
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|data| data.parent)
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.nodes.get(id.index()).and_then(|data| data.span)
    }

    /// Children in document order. Unknown ids have none.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(Node::children).unwrap_or_default()
    }

    /// Walk the parent chain upward, starting at the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Establish parent back-links for every node below `root`.
    ///
    /// The parent of `root` itself is left as is, so a freshly built subtree
    /// can be linked after it has been attached.
    pub fn link_parents(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in self.children(id) {
                if let Some(data) = self.nodes.get_mut(child.index()) {
                    data.parent = Some(id);
                    stack.push(child);
                }
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.data_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(data) = self.nodes.get_mut(child.index()) {
            data.parent = None;
        }
    }

    /// Substitute `new` for `old` in whatever slot of `parent` holds `old`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), TreeError> {
        self.data(new)?;
        let mut found = false;
        for slot in self.data_mut(parent)?.node.slots_mut() {
            match slot {
                SlotMut::One(id) if *id == old => {
                    *id = new;
                    found = true;
                }
                SlotMut::Opt(Some(id)) if *id == old => {
                    *id = new;
                    found = true;
                }
                SlotMut::Many(ids) => {
                    if let Some(pos) = ids.iter().position(|id| *id == old) {
                        ids[pos] = new;
                        found = true;
                    }
                }
                _ => {}
            }
            if found {
                break;
            }
        }
        if !found {
            return Err(TreeError::NotAChild { parent, child: old });
        }
        self.detach(old);
        self.attach(parent, new)
    }

    /// Remove `child` from `parent`.
    ///
    /// Optional slots become empty and list slots shrink; a required
    /// single-child slot is an error.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let data = self.data_mut(parent)?;
        let kind = data.node.kind();
        let mut outcome = Err(TreeError::NotAChild { parent, child });
        for slot in data.node.slots_mut() {
            match slot {
                SlotMut::One(id) if *id == child => {
                    outcome = Err(TreeError::RequiredSlot {
                        parent,
                        kind,
                        child,
                    });
                    break;
                }
                SlotMut::Opt(opt) if *opt == Some(child) => {
                    *opt = None;
                    outcome = Ok(());
                    break;
                }
                SlotMut::Many(ids) => {
                    if let Some(pos) = ids.iter().position(|id| *id == child) {
                        ids.remove(pos);
                        outcome = Ok(());
                        break;
                    }
                }
                _ => {}
            }
        }
        outcome?;
        self.detach(child);
        Ok(())
    }

    /// Replace `child` with an ordered run of nodes.
    ///
    /// List slots accept any number of replacements. A single-child slot
    /// accepts exactly one, which is then a plain replacement.
    pub fn splice_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        replacements: &[NodeId],
    ) -> Result<(), TreeError> {
        for id in replacements {
            self.data(*id)?;
        }
        let data = self.data_mut(parent)?;
        let kind = data.node.kind();
        let mut outcome = Err(TreeError::NotAChild { parent, child });
        let mut in_list = false;
        for slot in data.node.slots_mut() {
            match slot {
                SlotMut::Many(ids) => {
                    if let Some(pos) = ids.iter().position(|id| *id == child) {
                        ids.splice(pos..=pos, replacements.iter().copied());
                        in_list = true;
                        outcome = Ok(());
                        break;
                    }
                }
                SlotMut::One(id) if *id == child => {
                    outcome = Ok(());
                    break;
                }
                SlotMut::Opt(Some(id)) if *id == child => {
                    outcome = Ok(());
                    break;
                }
                _ => {}
            }
        }
        outcome?;
        if !in_list {
            return match replacements {
                [single] => self.replace_child(parent, child, *single),
                _ => Err(TreeError::NotAList {
                    parent,
                    kind,
                    child,
                    count: replacements.len(),
                }),
            };
        }
        self.detach(child);
        for id in replacements {
            self.attach(parent, *id)?;
        }
        Ok(())
    }

    /// Insert `new` into the list holding `anchor`, directly after it.
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.data(new)?;
        let parent = self.data(anchor)?.parent.ok_or(TreeError::Detached(anchor))?;
        let data = self.data_mut(parent)?;
        let kind = data.node.kind();
        let mut placed = false;
        for slot in data.node.slots_mut() {
            if let SlotMut::Many(ids) = slot {
                if let Some(pos) = ids.iter().position(|id| *id == anchor) {
                    ids.insert(pos + 1, new);
                    placed = true;
                    break;
                }
            }
        }
        if !placed {
            return Err(TreeError::NotAList {
                parent,
                kind,
                child: anchor,
                count: 2,
            });
        }
        self.attach(parent, new)
    }

    /// Insert `new` at `index` of the statement list of a `Block` or `Module`.
    ///
    /// An index past the end appends.
    pub fn insert_at(&mut self, block: NodeId, index: usize, new: NodeId) -> Result<(), TreeError> {
        self.data(new)?;
        let data = self.data_mut(block)?;
        match &mut data.node {
            Node::Block { body } | Node::Module { body } => {
                let index = index.min(body.len());
                body.insert(index, new);
            }
            other => {
                return Err(TreeError::NotABlock {
                    node: block,
                    kind: other.kind(),
                })
            }
        }
        self.attach(block, new)
    }

    /// The node following `id` in the same list slot of its parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.get(parent)?.slots().into_iter().find_map(|slot| match slot {
            Slot::Many(ids) => {
                let pos = ids.iter().position(|x| *x == id)?;
                ids.get(pos + 1).copied()
            }
            _ => None,
        })
    }

    /// Statement list of a `Block` or `Module`.
    pub fn statements(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.get(id)? {
            Node::Block { body } | Node::Module { body } => Some(body),
            _ => None,
        }
    }

    pub fn trailing_comment(&self, id: NodeId) -> Option<&str> {
        self.trailing_comments.get(&id).map(String::as_str)
    }

    pub fn set_trailing_comment(&mut self, id: NodeId, text: impl Into<String>) {
        self.trailing_comments.insert(id, text.into());
    }

    /// Copy the subtree at `id` into fresh, detached nodes of this tree.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let (node, span) = match self.nodes.get(id.index()) {
            Some(data) => (data.node.clone(), data.span),
            None => return id,
        };
        let copy = self.push(node, span);
        if let Some(comment) = self.trailing_comments.get(&id).cloned() {
            self.trailing_comments.insert(copy, comment);
        }
        let children = self.children(copy);
        let mut fresh = Vec::with_capacity(children.len());
        for child in &children {
            fresh.push(self.deep_clone(*child));
        }
        let mut fresh_iter = fresh.iter().copied();
        for slot in self.node_mut(copy).slots_mut() {
            match slot {
                SlotMut::One(id) => {
                    if let Some(next) = fresh_iter.next() {
                        *id = next;
                    }
                }
                SlotMut::Opt(opt) => {
                    if opt.is_some() {
                        *opt = fresh_iter.next();
                    }
                }
                SlotMut::Many(ids) => {
                    for id in ids.iter_mut() {
                        if let Some(next) = fresh_iter.next() {
                            *id = next;
                        }
                    }
                }
            }
        }
        for child in fresh {
            if let Some(data) = self.nodes.get_mut(child.index()) {
                data.parent = Some(copy);
            }
        }
        copy
    }

    /// Compare the subtree at `a` with the subtree at `b` in `other`.
    ///
    /// Ids, spans and parent links are ignored; kinds, labels, child counts
    /// and trailing comments must match.
    pub fn structurally_equal(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((x, y)) = stack.pop() {
            let (Some(nx), Some(ny)) = (self.get(x), other.get(y)) else {
                return false;
            };
            if nx.kind() != ny.kind() || nx.label() != ny.label() {
                return false;
            }
            if self.trailing_comment(x) != other.trailing_comment(y) {
                return false;
            }
            let cx = nx.children();
            let cy = ny.children();
            if cx.len() != cy.len() {
                return false;
            }
            stack.extend(cx.into_iter().zip(cy));
        }
        true
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(tree: &mut Tree, id: &str) -> NodeId {
        tree.alloc(Node::Name { id: id.to_string() })
    }

    fn block_of(tree: &mut Tree, names: &[&str]) -> (NodeId, Vec<NodeId>) {
        let stmts: Vec<NodeId> = names
            .iter()
            .map(|n| {
                let value = name(tree, n);
                tree.alloc(Node::ExprStmt { value })
            })
            .collect();
        let block = tree.alloc(Node::Block {
            body: stmts.clone(),
        });
        tree.link_parents(block);
        (block, stmts)
    }

    fn body(tree: &Tree, block: NodeId) -> Vec<NodeId> {
        tree.statements(block).map(<[NodeId]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn link_parents_sets_back_links() {
        let mut tree = Tree::new();
        let (block, stmts) = block_of(&mut tree, &["a", "b"]);
        assert_eq!(tree.parent(block), None);
        assert_eq!(tree.parent(stmts[0]), Some(block));
        let inner = tree.children(stmts[1])[0];
        assert_eq!(tree.parent(inner), Some(stmts[1]));
        assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![stmts[1], block]);
    }

    #[test]
    fn insert_after_places_directly_after_anchor() {
        let mut tree = Tree::new();
        let (block, stmts) = block_of(&mut tree, &["a", "b"]);
        let extra = tree.alloc(Node::Pass);
        tree.insert_after(stmts[0], extra).unwrap();
        assert_eq!(body(&tree, block), vec![stmts[0], extra, stmts[1]]);
        assert_eq!(tree.parent(extra), Some(block));
        assert_eq!(tree.next_sibling(stmts[0]), Some(extra));
        assert_eq!(tree.next_sibling(stmts[1]), None);
    }

    #[test]
    fn insert_at_clamps_index() {
        let mut tree = Tree::new();
        let (block, stmts) = block_of(&mut tree, &["a"]);
        let first = tree.alloc(Node::Pass);
        let last = tree.alloc(Node::Break);
        tree.insert_at(block, 0, first).unwrap();
        tree.insert_at(block, 99, last).unwrap();
        assert_eq!(body(&tree, block), vec![first, stmts[0], last]);

        let stray = tree.alloc(Node::Continue);
        let err = tree.insert_at(stmts[0], 0, stray).unwrap_err();
        assert!(matches!(err, TreeError::NotABlock { .. }));
    }

    #[test]
    fn remove_child_respects_slot_kinds() {
        let mut tree = Tree::new();
        let (block, stmts) = block_of(&mut tree, &["a", "b"]);
        tree.remove_child(block, stmts[0]).unwrap();
        assert_eq!(body(&tree, block), vec![stmts[1]]);
        assert_eq!(tree.parent(stmts[0]), None);

        let inner = tree.children(stmts[1])[0];
        let err = tree.remove_child(stmts[1], inner).unwrap_err();
        assert!(matches!(err, TreeError::RequiredSlot { .. }));

        let value = name(&mut tree, "x");
        let ret = tree.alloc(Node::Return { value: Some(value) });
        tree.link_parents(ret);
        tree.remove_child(ret, value).unwrap();
        assert_eq!(tree.node(ret), &Node::Return { value: None });
    }

    #[test]
    fn replace_and_splice() {
        let mut tree = Tree::new();
        let (block, stmts) = block_of(&mut tree, &["a", "b", "c"]);
        let x = tree.alloc(Node::Pass);
        let y = tree.alloc(Node::Break);
        tree.splice_child(block, stmts[1], &[x, y]).unwrap();
        assert_eq!(body(&tree, block), vec![stmts[0], x, y, stmts[2]]);
        assert_eq!(tree.parent(y), Some(block));

        let inner = tree.children(stmts[0])[0];
        let other = name(&mut tree, "z");
        tree.replace_child(stmts[0], inner, other).unwrap();
        assert_eq!(tree.children(stmts[0]), vec![other]);
        assert_eq!(tree.parent(other), Some(stmts[0]));

        let a = name(&mut tree, "p");
        let b = name(&mut tree, "q");
        let err = tree.splice_child(stmts[0], other, &[a, b]).unwrap_err();
        assert!(matches!(err, TreeError::NotAList { count: 2, .. }));
    }

    #[test]
    fn deep_clone_is_structurally_equal_and_independent() {
        let mut tree = Tree::new();
        let (block, _) = block_of(&mut tree, &["a", "b"]);
        let copy = tree.deep_clone(block);
        assert_ne!(copy, block);
        assert!(tree.structurally_equal(block, &tree, copy));

        let extra = tree.alloc(Node::Pass);
        tree.insert_at(copy, 0, extra).unwrap();
        assert!(!tree.structurally_equal(block, &tree, copy));
        assert_eq!(body(&tree, block).len(), 2);
    }

    #[test]
    fn stale_ids_are_leaves() {
        let tree = Tree::new();
        assert!(tree.children(NodeId(42)).is_empty());
        assert_eq!(tree.kind(NodeId(42)), None);
    }
}
