//! Literal wrapping.
//!
//! Every literal becomes `<namespace>.constant(<literal>)` unless it already
//! feeds a call into the namespace, is the key of an announce call, or sits in
//! a type annotation.

use slipform_cst::visitor::{RewriteError, Transformer, VisitOutcome};
use slipform_cst::{Node, NodeId, Tree};
use tracing::trace;

use super::namespace_call;
use crate::options::TranslateOptions;

#[derive(Debug)]
pub struct WrapConstants<'o> {
    options: &'o TranslateOptions,
    wrapped: usize,
}

impl<'o> WrapConstants<'o> {
    pub fn new(options: &'o TranslateOptions) -> Self {
        Self {
            options,
            wrapped: 0,
        }
    }

    /// Literals wrapped so far.
    pub fn wrapped(&self) -> usize {
        self.wrapped
    }

    fn already_wrapped(&self, tree: &Tree, literal: NodeId) -> bool {
        let Some(mut parent) = tree.parent(literal) else {
            return false;
        };
        if let Some(Node::Keyword { .. }) = tree.get(parent) {
            match tree.parent(parent) {
                Some(call) => parent = call,
                None => return false,
            }
        }
        if let Some(Node::Call { func, .. }) = tree.get(parent) {
            if let Some(Node::Attribute { attr, .. }) = tree.get(*func) {
                if *attr == self.options.announce_method {
                    return true;
                }
            }
        }
        matches!(
            tree.get(root_callee(tree, parent)),
            Some(Node::Name { id }) if *id == self.options.namespace
        )
    }
}

/// Follow call functions and attribute/subscript values down from `start`
/// to the first node that is none of those.
fn root_callee(tree: &Tree, start: NodeId) -> NodeId {
    let mut current = start;
    loop {
        match tree.get(current) {
            Some(Node::Call { func, .. }) => current = *func,
            Some(Node::Attribute { value, .. } | Node::Subscript { value, .. }) => {
                current = *value
            }
            _ => return current,
        }
    }
}

/// Whether `node` lies inside an annotation or a return annotation.
fn in_annotation(tree: &Tree, node: NodeId) -> bool {
    let mut child = node;
    for ancestor in tree.ancestors(node) {
        match tree.get(ancestor) {
            Some(Node::AnnAssign { annotation, .. }) if *annotation == child => return true,
            Some(Node::FunctionDef {
                returns: Some(returns),
                ..
            }) if *returns == child => return true,
            Some(Node::Param { annotation, .. }) if *annotation == Some(child) => return true,
            Some(node) if node.kind().is_statement() => return false,
            _ => {}
        }
        child = ancestor;
    }
    false
}

impl Transformer for WrapConstants<'_> {
    fn pass_name(&self) -> &'static str {
        "wrap-constants"
    }

    fn visit_parameters(
        &mut self,
        _tree: &mut Tree,
        _node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        Ok(VisitOutcome::skip_children())
    }

    fn visit_constant(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        if self.already_wrapped(tree, node) || in_annotation(tree, node) {
            return Ok(VisitOutcome::skip_children());
        }
        trace!(%node, "wrapping literal");
        let call = namespace_call(tree, &self.options.namespace, "constant", vec![node]);
        self.wrapped += 1;
        Ok(VisitOutcome::replaced(call))
    }
}
