// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Canonical source rendering.
//!
//! Output uses four-space indentation, one simple statement per line and the
//! minimum parentheses needed to preserve operator binding. Explicitly
//! parenthesized tuples keep their parentheses. Literals are written back from
//! their raw source text.

use crate::nodes::op::precedence;
use crate::nodes::{BinaryOp, Node, NodeId, ParamKind, Tree, UnaryOp};

/// Accumulates rendered text and the current indentation.
#[derive(Debug)]
pub struct CodegenState {
    pub tokens: String,
    pub indent_level: usize,
    pub default_newline: &'static str,
    pub default_indent: &'static str,
}

impl Default for CodegenState {
    fn default() -> Self {
        Self {
            tokens: String::new(),
            indent_level: 0,
            default_newline: "\n",
            default_indent: "    ",
        }
    }
}

impl CodegenState {
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn add_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.tokens.push_str(self.default_indent);
        }
    }

    pub fn add_newline(&mut self) {
        self.tokens.push_str(self.default_newline);
    }

    pub fn add_token(&mut self, tok: &str) {
        self.tokens.push_str(tok);
    }
}

/// Render the subtree at `id`. Statements and modules end with a newline;
/// expressions do not.
pub fn render(tree: &Tree, id: NodeId) -> String {
    let mut state = CodegenState::default();
    let generator = Codegen { tree };
    match tree.kind(id) {
        Some(kind) if kind.is_statement() => generator.statement(id, &mut state),
        Some(_) if matches!(tree.get(id), Some(Node::Module { .. } | Node::Block { .. })) => {
            for stmt in tree.children(id) {
                generator.statement(stmt, &mut state);
            }
        }
        Some(_) => generator.expr(id, precedence::TUPLE, &mut state),
        None => {}
    }
    state.tokens
}

struct Codegen<'t> {
    tree: &'t Tree,
}

impl Codegen<'_> {
    fn statement(&self, id: NodeId, state: &mut CodegenState) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        match node {
            Node::FunctionDef {
                name,
                is_async,
                decorators,
                params,
                returns,
                body,
            } => {
                for deco in decorators {
                    state.add_indent();
                    state.add_token("@");
                    if let Some(Node::Decorator { expr }) = self.tree.get(*deco) {
                        self.expr(*expr, precedence::TEST, state);
                    }
                    self.trailing(*deco, state);
                    state.add_newline();
                }
                state.add_indent();
                if *is_async {
                    state.add_token("async ");
                }
                state.add_token("def ");
                state.add_token(name);
                state.add_token("(");
                self.parameters(*params, state);
                state.add_token(")");
                if let Some(returns) = returns {
                    state.add_token(" -> ");
                    self.expr(*returns, precedence::TEST, state);
                }
                self.block(*body, state);
            }
            Node::If { .. } => {
                state.add_indent();
                self.if_chain(id, state);
            }
            Node::For {
                is_async,
                target,
                iter,
                body,
                orelse,
            } => {
                state.add_indent();
                if *is_async {
                    state.add_token("async ");
                }
                state.add_token("for ");
                self.expr(*target, precedence::TUPLE, state);
                state.add_token(" in ");
                self.expr(*iter, precedence::TUPLE, state);
                self.block(*body, state);
                self.else_block(*orelse, state);
            }
            Node::While { test, body, orelse } => {
                state.add_indent();
                state.add_token("while ");
                self.expr(*test, precedence::TEST, state);
                self.block(*body, state);
                self.else_block(*orelse, state);
            }
            _ => {
                state.add_indent();
                self.simple_statement(node, state);
                self.trailing(id, state);
                state.add_newline();
            }
        }
    }

    fn simple_statement(&self, node: &Node, state: &mut CodegenState) {
        match node {
            Node::Assign { targets, value } => {
                for target in targets {
                    self.expr(*target, precedence::TUPLE, state);
                    state.add_token(" = ");
                }
                self.expr(*value, precedence::TUPLE, state);
            }
            Node::AugAssign { target, op, value } => {
                self.expr(*target, precedence::TUPLE, state);
                state.add_token(" ");
                state.add_token(op.as_str());
                state.add_token("= ");
                self.expr(*value, precedence::TUPLE, state);
            }
            Node::AnnAssign {
                target,
                annotation,
                value,
            } => {
                self.expr(*target, precedence::TEST, state);
                state.add_token(": ");
                self.expr(*annotation, precedence::TEST, state);
                if let Some(value) = value {
                    state.add_token(" = ");
                    self.expr(*value, precedence::TUPLE, state);
                }
            }
            Node::ExprStmt { value } => self.expr(*value, precedence::TUPLE, state),
            Node::Return { value } => {
                state.add_token("return");
                if let Some(value) = value {
                    state.add_token(" ");
                    self.expr(*value, precedence::TUPLE, state);
                }
            }
            Node::Raise { exc, cause } => {
                state.add_token("raise");
                if let Some(exc) = exc {
                    state.add_token(" ");
                    self.expr(*exc, precedence::TEST, state);
                }
                if let Some(cause) = cause {
                    state.add_token(" from ");
                    self.expr(*cause, precedence::TEST, state);
                }
            }
            Node::Assert { test, msg } => {
                state.add_token("assert ");
                self.expr(*test, precedence::TEST, state);
                if let Some(msg) = msg {
                    state.add_token(", ");
                    self.expr(*msg, precedence::TEST, state);
                }
            }
            Node::Pass => state.add_token("pass"),
            Node::Break => state.add_token("break"),
            Node::Continue => state.add_token("continue"),
            Node::Comment { text } => state.add_token(text),
            _ => {}
        }
    }

    fn trailing(&self, id: NodeId, state: &mut CodegenState) {
        if let Some(comment) = self.tree.trailing_comment(id) {
            state.add_token("  ");
            state.add_token(comment);
        }
    }

    /// Header colon, header comment and indented body.
    fn block(&self, id: NodeId, state: &mut CodegenState) {
        state.add_token(":");
        self.trailing(id, state);
        state.add_newline();
        state.indent();
        let body = self.tree.statements(id).unwrap_or(&[]);
        let mut has_code = false;
        for stmt in body {
            has_code |= !matches!(self.tree.get(*stmt), Some(Node::Comment { .. }));
            self.statement(*stmt, state);
        }
        if !has_code {
            state.add_indent();
            state.add_token("pass");
            state.add_newline();
        }
        state.dedent();
    }

    fn else_block(&self, orelse: Option<NodeId>, state: &mut CodegenState) {
        if let Some(orelse) = orelse {
            state.add_indent();
            state.add_token("else");
            self.block(orelse, state);
        }
    }

    fn if_chain(&self, id: NodeId, state: &mut CodegenState) {
        let Some(Node::If {
            test,
            body,
            orelse,
            is_elif,
        }) = self.tree.get(id)
        else {
            return;
        };
        state.add_token(if *is_elif { "elif " } else { "if " });
        self.expr(*test, precedence::TEST, state);
        self.block(*body, state);
        let Some(orelse) = orelse else {
            return;
        };
        if let Some([nested]) = self.tree.statements(*orelse) {
            if matches!(self.tree.get(*nested), Some(Node::If { is_elif: true, .. })) {
                state.add_indent();
                self.if_chain(*nested, state);
                return;
            }
        }
        self.else_block(Some(*orelse), state);
    }

    fn parameters(&self, id: NodeId, state: &mut CodegenState) {
        let params = self.tree.children(id);
        let has_var_positional = params.iter().any(|p| {
            matches!(
                self.tree.get(*p),
                Some(Node::Param {
                    kind: ParamKind::VarPositional,
                    ..
                })
            )
        });
        let mut parts: Vec<String> = Vec::new();
        let mut prev_kind = None;
        for param in params {
            let Some(Node::Param {
                name,
                kind,
                annotation,
                default,
            }) = self.tree.get(param)
            else {
                continue;
            };
            if prev_kind == Some(ParamKind::PositionalOnly) && *kind != ParamKind::PositionalOnly {
                parts.push("/".to_string());
            }
            if *kind == ParamKind::KeywordOnly
                && !has_var_positional
                && prev_kind != Some(ParamKind::KeywordOnly)
            {
                parts.push("*".to_string());
            }
            let mut text = match kind {
                ParamKind::VarPositional => format!("*{name}"),
                ParamKind::VarKeyword => format!("**{name}"),
                _ => name.clone(),
            };
            if let Some(annotation) = annotation {
                text.push_str(": ");
                text.push_str(&self.expr_string(*annotation, precedence::TEST));
            }
            if let Some(default) = default {
                text.push_str(if annotation.is_some() { " = " } else { "=" });
                text.push_str(&self.expr_string(*default, precedence::TEST));
            }
            parts.push(text);
            prev_kind = Some(*kind);
        }
        if prev_kind == Some(ParamKind::PositionalOnly) {
            parts.push("/".to_string());
        }
        state.add_token(&parts.join(", "));
    }

    fn expr_string(&self, id: NodeId, min: u8) -> String {
        let mut state = CodegenState::default();
        self.expr(id, min, &mut state);
        state.tokens
    }

    fn precedence_of(&self, node: &Node) -> u8 {
        match node {
            Node::Tuple {
                parenthesized: false,
                elts,
            } if !elts.is_empty() => precedence::TUPLE,
            Node::IfExp { .. } => precedence::TEST,
            Node::BoolOp { op, .. } => op.precedence(),
            Node::UnaryOp { op, .. } => op.precedence(),
            Node::Compare { .. } => precedence::COMPARISON,
            Node::BinOp { op, .. } => op.precedence(),
            Node::Attribute { .. } | Node::Subscript { .. } | Node::Call { .. } => {
                precedence::PRIMARY
            }
            _ => precedence::ATOM,
        }
    }

    fn expr(&self, id: NodeId, min: u8, state: &mut CodegenState) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        let parens = self.precedence_of(node) < min;
        if parens {
            state.add_token("(");
            self.expr_inner(node, precedence::TUPLE, state);
            state.add_token(")");
            return;
        }
        self.expr_inner(node, min, state);
    }

    fn comma_separated(&self, ids: &[NodeId], min: u8, state: &mut CodegenState) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                state.add_token(", ");
            }
            self.expr(*id, min, state);
        }
    }

    fn expr_inner(&self, node: &Node, min: u8, state: &mut CodegenState) {
        match node {
            Node::Name { id } => state.add_token(id),
            Node::Constant { raw, .. } | Node::FormattedString { raw } => state.add_token(raw),
            Node::Attribute { value, attr } => {
                self.expr(*value, precedence::PRIMARY, state);
                state.add_token(".");
                state.add_token(attr);
            }
            Node::Subscript { value, slice } => {
                self.expr(*value, precedence::PRIMARY, state);
                state.add_token("[");
                match self.tree.get(*slice) {
                    Some(Node::Tuple {
                        elts,
                        parenthesized: false,
                    }) if !elts.is_empty() => {
                        self.comma_separated(elts, precedence::TEST, state);
                        if elts.len() == 1 {
                            state.add_token(",");
                        }
                    }
                    _ => self.expr(*slice, precedence::TEST, state),
                }
                state.add_token("]");
            }
            Node::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(*lower, precedence::TEST, state);
                }
                state.add_token(":");
                if let Some(upper) = upper {
                    self.expr(*upper, precedence::TEST, state);
                }
                if let Some(step) = step {
                    state.add_token(":");
                    self.expr(*step, precedence::TEST, state);
                }
            }
            Node::Call { func, args } => {
                self.expr(*func, precedence::PRIMARY, state);
                state.add_token("(");
                self.comma_separated(args, precedence::TEST, state);
                state.add_token(")");
            }
            Node::Keyword { arg, value } => {
                state.add_token(arg);
                state.add_token("=");
                self.expr(*value, precedence::TEST, state);
            }
            Node::Starred { value } => {
                state.add_token("*");
                self.expr(*value, precedence::BIT_OR, state);
            }
            Node::DoubleStarred { value } => {
                state.add_token("**");
                self.expr(*value, precedence::BIT_OR, state);
            }
            Node::BinOp { left, op, right } => {
                let prec = op.precedence();
                let (left_min, right_min) = if *op == BinaryOp::Pow {
                    (prec + 1, precedence::FACTOR)
                } else {
                    (prec, prec + 1)
                };
                self.expr(*left, left_min, state);
                state.add_token(" ");
                state.add_token(op.as_str());
                state.add_token(" ");
                self.expr(*right, right_min, state);
            }
            Node::UnaryOp { op, operand } => {
                state.add_token(op.as_str());
                let operand_min = match op {
                    UnaryOp::Not => precedence::NOT,
                    _ => precedence::FACTOR,
                };
                self.expr(*operand, operand_min, state);
            }
            Node::BoolOp { op, values } => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        state.add_token(" ");
                        state.add_token(op.as_str());
                        state.add_token(" ");
                    }
                    self.expr(*value, op.precedence() + 1, state);
                }
            }
            Node::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expr(*left, precedence::BIT_OR, state);
                for (op, comparator) in ops.iter().zip(comparators) {
                    state.add_token(" ");
                    state.add_token(op.as_str());
                    state.add_token(" ");
                    self.expr(*comparator, precedence::BIT_OR, state);
                }
            }
            Node::IfExp { test, body, orelse } => {
                self.expr(*body, precedence::OR, state);
                state.add_token(" if ");
                self.expr(*test, precedence::OR, state);
                state.add_token(" else ");
                self.expr(*orelse, precedence::TEST, state);
            }
            Node::Tuple {
                elts,
                parenthesized,
            } => {
                let wrap = *parenthesized || elts.is_empty() || min > precedence::TUPLE;
                if wrap {
                    state.add_token("(");
                }
                self.comma_separated(elts, precedence::TEST, state);
                if elts.len() == 1 {
                    state.add_token(",");
                }
                if wrap {
                    state.add_token(")");
                }
            }
            Node::List { elts } => {
                state.add_token("[");
                self.comma_separated(elts, precedence::TEST, state);
                state.add_token("]");
            }
            Node::Set { elts } => {
                state.add_token("{");
                self.comma_separated(elts, precedence::TEST, state);
                state.add_token("}");
            }
            Node::Dict { entries } => {
                state.add_token("{");
                self.comma_separated(entries, precedence::TEST, state);
                state.add_token("}");
            }
            Node::DictEntry { key, value } => {
                self.expr(*key, precedence::TEST, state);
                state.add_token(": ");
                self.expr(*value, precedence::TEST, state);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::ConstantKind;

    #[test]
    fn generated_nodes_get_parentheses() {
        let mut tree = Tree::new();
        let a = tree.alloc(Node::Name { id: "a".into() });
        let b = tree.alloc(Node::Name { id: "b".into() });
        let c = tree.alloc(Node::Name { id: "c".into() });
        let sum = tree.alloc(Node::BinOp {
            left: a,
            op: BinaryOp::Add,
            right: b,
        });
        let product = tree.alloc(Node::BinOp {
            left: sum,
            op: BinaryOp::Mult,
            right: c,
        });
        assert_eq!(render(&tree, product), "(a + b) * c");
    }

    #[test]
    fn empty_block_renders_pass() {
        let mut tree = Tree::new();
        let params = tree.alloc(Node::Parameters { params: vec![] });
        let body = tree.alloc(Node::Block { body: vec![] });
        let def = tree.alloc(Node::FunctionDef {
            name: "f".into(),
            is_async: false,
            decorators: vec![],
            params,
            returns: None,
            body,
        });
        assert_eq!(render(&tree, def), "def f():\n    pass\n");
    }

    #[test]
    fn single_element_tuple_keeps_comma() {
        let mut tree = Tree::new();
        let one = tree.alloc(Node::Constant {
            kind: ConstantKind::Int,
            raw: "1".into(),
        });
        let tuple = tree.alloc(Node::Tuple {
            elts: vec![one],
            parenthesized: true,
        });
        assert_eq!(render(&tree, tuple), "(1,)");
    }

    #[test]
    fn bare_tuple_argument_is_wrapped_once() {
        let mut tree = Tree::new();
        let a = tree.alloc(Node::Name { id: "a".into() });
        let b = tree.alloc(Node::Name { id: "b".into() });
        let f = tree.alloc(Node::Name { id: "f".into() });
        let pair = tree.alloc(Node::Tuple {
            elts: vec![a, b],
            parenthesized: false,
        });
        let call = tree.alloc(Node::Call {
            func: f,
            args: vec![pair],
        });
        assert_eq!(render(&tree, call), "f((a, b))");
        assert_eq!(render(&tree, pair), "a, b");
    }
}
