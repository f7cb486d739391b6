// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Transformer trait definitions for tree rewriting.

use thiserror::Error;

use crate::nodes::{NodeId, NodeKind, Tree, TreeError};

/// What a handler did to the node it was given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Rewrite {
    /// Leave the node in place.
    #[default]
    Unchanged,
    /// Substitute another node in the parent's slot.
    Replaced(NodeId),
    /// Remove the node from its parent.
    Deleted,
    /// Substitute an ordered run of nodes in the parent's list.
    SplicedWith(Vec<NodeId>),
}

/// Result of visiting a node: the rewrite to apply and whether the walker
/// should descend into the (possibly replaced) node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    pub rewrite: Rewrite,
    pub recurse: bool,
}

impl Default for VisitOutcome {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl VisitOutcome {
    /// No change; recurse into children.
    pub fn unchanged() -> Self {
        Self {
            rewrite: Rewrite::Unchanged,
            recurse: true,
        }
    }

    /// No change; do not recurse.
    pub fn skip_children() -> Self {
        Self {
            rewrite: Rewrite::Unchanged,
            recurse: false,
        }
    }

    /// Replace the node. Children of the replacement are not visited unless
    /// [`VisitOutcome::recurse`] is set.
    pub fn replaced(node: NodeId) -> Self {
        Self {
            rewrite: Rewrite::Replaced(node),
            recurse: false,
        }
    }

    pub fn deleted() -> Self {
        Self {
            rewrite: Rewrite::Deleted,
            recurse: false,
        }
    }

    pub fn spliced(nodes: Vec<NodeId>) -> Self {
        Self {
            rewrite: Rewrite::SplicedWith(nodes),
            recurse: false,
        }
    }

    /// Override the recursion flag.
    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }
}

/// A recoverable failure while rewriting one node.
///
/// The dispatcher reports these as diagnostics and moves on; the node is
/// left unchanged and its children are not visited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("chained comparison with {operators} operators is not rewritten")]
    ChainedComparison { operators: usize },

    #[error("unsupported {what}")]
    Unsupported { what: String },

    #[error("unexpected {found} where {expected} was expected")]
    Malformed { expected: NodeKind, found: NodeKind },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Macro to generate transformer handler signatures.
///
/// Each entry `name: Kind` produces `visit_name(&mut self, tree, node)` with
/// a default that leaves the node unchanged and recurses.
macro_rules! transformer_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $kind:ident
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Handle a `", stringify!($kind), "` node.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](
                    &mut self,
                    tree: &mut Tree,
                    node: NodeId,
                ) -> Result<VisitOutcome, RewriteError> {
                    Ok(VisitOutcome::unchanged())
                }
            )*
        }
    };
}

/// A rewrite pass over a [`Tree`].
///
/// Implement the handlers for the node kinds the pass cares about; every
/// other kind is left unchanged and recursed into. Handlers receive the tree
/// mutably so they can allocate replacement nodes or insert siblings.
pub trait Transformer {
    /// Name used in diagnostics and log lines.
    fn pass_name(&self) -> &'static str;

    // Module and definitions
    transformer_methods! {
        module: Module,
        function_def: FunctionDef,
        decorator: Decorator,
        parameters: Parameters,
        param: Param,
        block: Block,
    }

    // Statements
    transformer_methods! {
        assign: Assign,
        aug_assign: AugAssign,
        ann_assign: AnnAssign,
        expr_stmt: ExprStmt,
        return_stmt: Return,
        pass_stmt: Pass,
        break_stmt: Break,
        continue_stmt: Continue,
        raise_stmt: Raise,
        assert_stmt: Assert,
        if_stmt: If,
        for_stmt: For,
        while_stmt: While,
        comment: Comment,
    }

    // Expressions
    transformer_methods! {
        name: Name,
        constant: Constant,
        formatted_string: FormattedString,
        attribute: Attribute,
        subscript: Subscript,
        slice: Slice,
        call: Call,
        keyword: Keyword,
        starred: Starred,
        double_starred: DoubleStarred,
        bin_op: BinOp,
        unary_op: UnaryOp,
        bool_op: BoolOp,
        compare: Compare,
        if_exp: IfExp,
        tuple: Tuple,
        list: List,
        set: Set,
        dict: Dict,
        dict_entry: DictEntry,
    }
}

/// Invoke the handler matching `kind`.
pub fn dispatch_handler<T: Transformer + ?Sized>(
    transformer: &mut T,
    tree: &mut Tree,
    node: NodeId,
    kind: NodeKind,
) -> Result<VisitOutcome, RewriteError> {
    match kind {
        NodeKind::Module => transformer.visit_module(tree, node),
        NodeKind::FunctionDef => transformer.visit_function_def(tree, node),
        NodeKind::Decorator => transformer.visit_decorator(tree, node),
        NodeKind::Parameters => transformer.visit_parameters(tree, node),
        NodeKind::Param => transformer.visit_param(tree, node),
        NodeKind::Block => transformer.visit_block(tree, node),
        NodeKind::Assign => transformer.visit_assign(tree, node),
        NodeKind::AugAssign => transformer.visit_aug_assign(tree, node),
        NodeKind::AnnAssign => transformer.visit_ann_assign(tree, node),
        NodeKind::ExprStmt => transformer.visit_expr_stmt(tree, node),
        NodeKind::Return => transformer.visit_return_stmt(tree, node),
        NodeKind::Pass => transformer.visit_pass_stmt(tree, node),
        NodeKind::Break => transformer.visit_break_stmt(tree, node),
        NodeKind::Continue => transformer.visit_continue_stmt(tree, node),
        NodeKind::Raise => transformer.visit_raise_stmt(tree, node),
        NodeKind::Assert => transformer.visit_assert_stmt(tree, node),
        NodeKind::If => transformer.visit_if_stmt(tree, node),
        NodeKind::For => transformer.visit_for_stmt(tree, node),
        NodeKind::While => transformer.visit_while_stmt(tree, node),
        NodeKind::Comment => transformer.visit_comment(tree, node),
        NodeKind::Name => transformer.visit_name(tree, node),
        NodeKind::Constant => transformer.visit_constant(tree, node),
        NodeKind::FormattedString => transformer.visit_formatted_string(tree, node),
        NodeKind::Attribute => transformer.visit_attribute(tree, node),
        NodeKind::Subscript => transformer.visit_subscript(tree, node),
        NodeKind::Slice => transformer.visit_slice(tree, node),
        NodeKind::Call => transformer.visit_call(tree, node),
        NodeKind::Keyword => transformer.visit_keyword(tree, node),
        NodeKind::Starred => transformer.visit_starred(tree, node),
        NodeKind::DoubleStarred => transformer.visit_double_starred(tree, node),
        NodeKind::BinOp => transformer.visit_bin_op(tree, node),
        NodeKind::UnaryOp => transformer.visit_unary_op(tree, node),
        NodeKind::BoolOp => transformer.visit_bool_op(tree, node),
        NodeKind::Compare => transformer.visit_compare(tree, node),
        NodeKind::IfExp => transformer.visit_if_exp(tree, node),
        NodeKind::Tuple => transformer.visit_tuple(tree, node),
        NodeKind::List => transformer.visit_list(tree, node),
        NodeKind::Set => transformer.visit_set(tree, node),
        NodeKind::Dict => transformer.visit_dict(tree, node),
        NodeKind::DictEntry => transformer.visit_dict_entry(tree, node),
    }
}
