// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node payloads and kind tags.
//!
//! [`Node`] is a closed sum type over every construct the parser produces.
//! Child links are [`NodeId`]s into the owning [`Tree`](super::Tree) arena,
//! held either in single-child slots (`NodeId` / `Option<NodeId>`) or ordered
//! list slots (`Vec<NodeId>`).

use std::fmt;

use super::op::{BinaryOp, BoolOp, CompOp, UnaryOp};
use super::NodeId;

/// Literal categories recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Int,
    Float,
    Imaginary,
    Str,
    Bytes,
    True,
    False,
    None,
    Ellipsis,
}

/// How a parameter binds its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Declared before a `/` marker.
    PositionalOnly,
    /// Ordinary positional-or-keyword parameter.
    Regular,
    /// `*args`
    VarPositional,
    /// Declared after `*` or `*args`.
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Module {
        body: Vec<NodeId>,
    },
    FunctionDef {
        name: String,
        is_async: bool,
        decorators: Vec<NodeId>,
        params: NodeId,
        returns: Option<NodeId>,
        body: NodeId,
    },
    Decorator {
        expr: NodeId,
    },
    Parameters {
        params: Vec<NodeId>,
    },
    Param {
        name: String,
        kind: ParamKind,
        annotation: Option<NodeId>,
        default: Option<NodeId>,
    },
    /// An indented statement block (or a single-line suite).
    Block {
        body: Vec<NodeId>,
    },
    Assign {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    AugAssign {
        target: NodeId,
        op: BinaryOp,
        value: NodeId,
    },
    AnnAssign {
        target: NodeId,
        annotation: NodeId,
        value: Option<NodeId>,
    },
    ExprStmt {
        value: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    Pass,
    Break,
    Continue,
    Raise {
        exc: Option<NodeId>,
        cause: Option<NodeId>,
    },
    Assert {
        test: NodeId,
        msg: Option<NodeId>,
    },
    If {
        test: NodeId,
        body: NodeId,
        /// A `Block`; for `elif` the block holds a single `If` with `is_elif`.
        orelse: Option<NodeId>,
        is_elif: bool,
    },
    For {
        is_async: bool,
        target: NodeId,
        iter: NodeId,
        body: NodeId,
        orelse: Option<NodeId>,
    },
    While {
        test: NodeId,
        body: NodeId,
        orelse: Option<NodeId>,
    },
    /// A statement-level comment; `text` includes the leading `#`.
    Comment {
        text: String,
    },
    Name {
        id: String,
    },
    /// A literal value; `raw` is the exact source text.
    Constant {
        kind: ConstantKind,
        raw: String,
    },
    /// An f-string, kept verbatim. Not a literal: it embeds expressions.
    FormattedString {
        raw: String,
    },
    Attribute {
        value: NodeId,
        attr: String,
    },
    Subscript {
        value: NodeId,
        slice: NodeId,
    },
    Slice {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },
    Call {
        func: NodeId,
        args: Vec<NodeId>,
    },
    /// `name=value` in a call.
    Keyword {
        arg: String,
        value: NodeId,
    },
    /// `*value` in a call, target or display.
    Starred {
        value: NodeId,
    },
    /// `**value` in a call or dict display.
    DoubleStarred {
        value: NodeId,
    },
    BinOp {
        left: NodeId,
        op: BinaryOp,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOp,
        operand: NodeId,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<NodeId>,
    },
    /// `left ops[0] comparators[0] ops[1] comparators[1] ...`
    Compare {
        left: NodeId,
        ops: Vec<CompOp>,
        comparators: Vec<NodeId>,
    },
    IfExp {
        test: NodeId,
        body: NodeId,
        orelse: NodeId,
    },
    Tuple {
        elts: Vec<NodeId>,
        parenthesized: bool,
    },
    List {
        elts: Vec<NodeId>,
    },
    Set {
        elts: Vec<NodeId>,
    },
    Dict {
        entries: Vec<NodeId>,
    },
    DictEntry {
        key: NodeId,
        value: NodeId,
    },
}

/// Fieldless tag for [`Node`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Module,
    FunctionDef,
    Decorator,
    Parameters,
    Param,
    Block,
    Assign,
    AugAssign,
    AnnAssign,
    ExprStmt,
    Return,
    Pass,
    Break,
    Continue,
    Raise,
    Assert,
    If,
    For,
    While,
    Comment,
    Name,
    Constant,
    FormattedString,
    Attribute,
    Subscript,
    Slice,
    Call,
    Keyword,
    Starred,
    DoubleStarred,
    BinOp,
    UnaryOp,
    BoolOp,
    Compare,
    IfExp,
    Tuple,
    List,
    Set,
    Dict,
    DictEntry,
}

impl NodeKind {
    /// Whether nodes of this kind appear directly in a statement block.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDef
                | NodeKind::Assign
                | NodeKind::AugAssign
                | NodeKind::AnnAssign
                | NodeKind::ExprStmt
                | NodeKind::Return
                | NodeKind::Pass
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Raise
                | NodeKind::Assert
                | NodeKind::If
                | NodeKind::For
                | NodeKind::While
                | NodeKind::Comment
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A read-only child slot.
pub(crate) enum Slot<'n> {
    One(&'n NodeId),
    Opt(&'n Option<NodeId>),
    Many(&'n Vec<NodeId>),
}

/// A mutable child slot.
pub(crate) enum SlotMut<'n> {
    One(&'n mut NodeId),
    Opt(&'n mut Option<NodeId>),
    Many(&'n mut Vec<NodeId>),
}

macro_rules! node_slots {
    ($node:expr, $slot:ident) => {
        match $node {
            Node::Module { body } => vec![$slot::Many(body)],
            Node::FunctionDef {
                decorators,
                params,
                returns,
                body,
                ..
            } => vec![
                $slot::Many(decorators),
                $slot::One(params),
                $slot::Opt(returns),
                $slot::One(body),
            ],
            Node::Decorator { expr } => vec![$slot::One(expr)],
            Node::Parameters { params } => vec![$slot::Many(params)],
            Node::Param {
                annotation,
                default,
                ..
            } => vec![$slot::Opt(annotation), $slot::Opt(default)],
            Node::Block { body } => vec![$slot::Many(body)],
            Node::Assign { targets, value } => vec![$slot::Many(targets), $slot::One(value)],
            Node::AugAssign { target, value, .. } => vec![$slot::One(target), $slot::One(value)],
            Node::AnnAssign {
                target,
                annotation,
                value,
            } => vec![
                $slot::One(target),
                $slot::One(annotation),
                $slot::Opt(value),
            ],
            Node::ExprStmt { value } => vec![$slot::One(value)],
            Node::Return { value } => vec![$slot::Opt(value)],
            Node::Pass | Node::Break | Node::Continue => vec![],
            Node::Raise { exc, cause } => vec![$slot::Opt(exc), $slot::Opt(cause)],
            Node::Assert { test, msg } => vec![$slot::One(test), $slot::Opt(msg)],
            Node::If {
                test, body, orelse, ..
            } => vec![$slot::One(test), $slot::One(body), $slot::Opt(orelse)],
            Node::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => vec![
                $slot::One(target),
                $slot::One(iter),
                $slot::One(body),
                $slot::Opt(orelse),
            ],
            Node::While { test, body, orelse } => {
                vec![$slot::One(test), $slot::One(body), $slot::Opt(orelse)]
            }
            Node::Comment { .. }
            | Node::Name { .. }
            | Node::Constant { .. }
            | Node::FormattedString { .. } => vec![],
            Node::Attribute { value, .. } => vec![$slot::One(value)],
            Node::Subscript { value, slice } => vec![$slot::One(value), $slot::One(slice)],
            Node::Slice { lower, upper, step } => {
                vec![$slot::Opt(lower), $slot::Opt(upper), $slot::Opt(step)]
            }
            Node::Call { func, args } => vec![$slot::One(func), $slot::Many(args)],
            Node::Keyword { value, .. } => vec![$slot::One(value)],
            Node::Starred { value } | Node::DoubleStarred { value } => vec![$slot::One(value)],
            Node::BinOp { left, right, .. } => vec![$slot::One(left), $slot::One(right)],
            Node::UnaryOp { operand, .. } => vec![$slot::One(operand)],
            Node::BoolOp { values, .. } => vec![$slot::Many(values)],
            Node::Compare {
                left, comparators, ..
            } => vec![$slot::One(left), $slot::Many(comparators)],
            Node::IfExp { test, body, orelse } => {
                // Document order is `body if test else orelse`.
                vec![$slot::One(body), $slot::One(test), $slot::One(orelse)]
            }
            Node::Tuple { elts, .. } | Node::List { elts } | Node::Set { elts } => {
                vec![$slot::Many(elts)]
            }
            Node::Dict { entries } => vec![$slot::Many(entries)],
            Node::DictEntry { key, value } => vec![$slot::One(key), $slot::One(value)],
        }
    };
}

impl Node {
    /// The kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Module { .. } => NodeKind::Module,
            Node::FunctionDef { .. } => NodeKind::FunctionDef,
            Node::Decorator { .. } => NodeKind::Decorator,
            Node::Parameters { .. } => NodeKind::Parameters,
            Node::Param { .. } => NodeKind::Param,
            Node::Block { .. } => NodeKind::Block,
            Node::Assign { .. } => NodeKind::Assign,
            Node::AugAssign { .. } => NodeKind::AugAssign,
            Node::AnnAssign { .. } => NodeKind::AnnAssign,
            Node::ExprStmt { .. } => NodeKind::ExprStmt,
            Node::Return { .. } => NodeKind::Return,
            Node::Pass => NodeKind::Pass,
            Node::Break => NodeKind::Break,
            Node::Continue => NodeKind::Continue,
            Node::Raise { .. } => NodeKind::Raise,
            Node::Assert { .. } => NodeKind::Assert,
            Node::If { .. } => NodeKind::If,
            Node::For { .. } => NodeKind::For,
            Node::While { .. } => NodeKind::While,
            Node::Comment { .. } => NodeKind::Comment,
            Node::Name { .. } => NodeKind::Name,
            Node::Constant { .. } => NodeKind::Constant,
            Node::FormattedString { .. } => NodeKind::FormattedString,
            Node::Attribute { .. } => NodeKind::Attribute,
            Node::Subscript { .. } => NodeKind::Subscript,
            Node::Slice { .. } => NodeKind::Slice,
            Node::Call { .. } => NodeKind::Call,
            Node::Keyword { .. } => NodeKind::Keyword,
            Node::Starred { .. } => NodeKind::Starred,
            Node::DoubleStarred { .. } => NodeKind::DoubleStarred,
            Node::BinOp { .. } => NodeKind::BinOp,
            Node::UnaryOp { .. } => NodeKind::UnaryOp,
            Node::BoolOp { .. } => NodeKind::BoolOp,
            Node::Compare { .. } => NodeKind::Compare,
            Node::IfExp { .. } => NodeKind::IfExp,
            Node::Tuple { .. } => NodeKind::Tuple,
            Node::List { .. } => NodeKind::List,
            Node::Set { .. } => NodeKind::Set,
            Node::Dict { .. } => NodeKind::Dict,
            Node::DictEntry { .. } => NodeKind::DictEntry,
        }
    }

    pub(crate) fn slots(&self) -> Vec<Slot<'_>> {
        node_slots!(self, Slot)
    }

    pub(crate) fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        node_slots!(self, SlotMut)
    }

    /// Children in document order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for slot in self.slots() {
            match slot {
                Slot::One(id) => out.push(*id),
                Slot::Opt(id) => out.extend(id.iter().copied()),
                Slot::Many(ids) => out.extend(ids.iter().copied()),
            }
        }
        out
    }

    /// The payload of this node that is not a child link.
    ///
    /// Two nodes with the same kind and label differ only in their children.
    pub fn label(&self) -> String {
        match self {
            Node::FunctionDef { name, is_async, .. } => {
                format!("{}{}", if *is_async { "async " } else { "" }, name)
            }
            Node::Param { name, kind, .. } => format!("{:?} {}", kind, name),
            Node::AugAssign { op, .. } => op.as_str().to_string(),
            Node::If { is_elif, .. } => String::from(if *is_elif { "elif" } else { "if" }),
            Node::For { is_async, .. } => String::from(if *is_async { "async" } else { "" }),
            Node::Comment { text } => text.clone(),
            Node::Name { id } => id.clone(),
            Node::Constant { raw, .. } | Node::FormattedString { raw } => raw.clone(),
            Node::Attribute { attr, .. } => attr.clone(),
            Node::Keyword { arg, .. } => arg.clone(),
            Node::BinOp { op, .. } => op.as_str().to_string(),
            Node::UnaryOp { op, .. } => op.as_str().to_string(),
            Node::BoolOp { op, .. } => op.as_str().to_string(),
            Node::Compare { ops, .. } => ops
                .iter()
                .map(CompOp::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            Node::Tuple { parenthesized, .. } => {
                String::from(if *parenthesized { "()" } else { "" })
            }
            Node::Slice {
                lower, upper, step, ..
            } => format!(
                "{}:{}:{}",
                lower.is_some(),
                upper.is_some(),
                step.is_some()
            ),
            _ => String::new(),
        }
    }
}
