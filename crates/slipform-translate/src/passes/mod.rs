//! The rewrite passes, in the order the orchestrator runs them.
//!
//! Each pass is a [`Transformer`](slipform_cst::visitor::Transformer) run by
//! the dispatcher, except placeholder injection, which edits the definition
//! directly and fails hard on unsupported signatures.

mod constants;
mod decorators;
mod membership;
mod placeholders;
mod set_names;

pub use constants::WrapConstants;
pub use decorators::StripDecorators;
pub use membership::RewriteMembership;
pub use placeholders::{inject_placeholders, validate_parameters};
pub use set_names::{flatten_target, RegisterBindings};

use slipform_cst::{ConstantKind, Node, NodeId, Tree};

/// `Name` node for `id`.
pub(crate) fn name(tree: &mut Tree, id: &str) -> NodeId {
    tree.alloc(Node::Name { id: id.to_string() })
}

/// Single-quoted string literal holding an identifier.
pub(crate) fn key_literal(tree: &mut Tree, key: &str) -> NodeId {
    tree.alloc(Node::Constant {
        kind: ConstantKind::Str,
        raw: format!("'{key}'"),
    })
}

/// `receiver.method(args...)`, with parent links set below the call.
pub(crate) fn method_call(
    tree: &mut Tree,
    receiver: NodeId,
    method: &str,
    args: Vec<NodeId>,
) -> NodeId {
    let func = tree.alloc(Node::Attribute {
        value: receiver,
        attr: method.to_string(),
    });
    let call = tree.alloc(Node::Call { func, args });
    tree.link_parents(call);
    call
}

/// `namespace.method(args...)`.
pub(crate) fn namespace_call(
    tree: &mut Tree,
    namespace: &str,
    method: &str,
    args: Vec<NodeId>,
) -> NodeId {
    let receiver = name(tree, namespace);
    method_call(tree, receiver, method, args)
}

/// `name.<announce>('name')` as a statement.
pub(crate) fn announce_statement(tree: &mut Tree, binding: &str, announce: &str) -> NodeId {
    let receiver = name(tree, binding);
    let key = key_literal(tree, binding);
    let call = method_call(tree, receiver, announce, vec![key]);
    let stmt = tree.alloc(Node::ExprStmt { value: call });
    tree.link_parents(stmt);
    stmt
}
