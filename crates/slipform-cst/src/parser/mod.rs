// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser producing an arena [`Tree`].
//!
//! The grammar is the statement and expression subset needed for
//! straight-line dataflow definitions. Anything outside it is rejected with
//! [`ParserError::Unsupported`] rather than being skipped.

mod errors;

pub use errors::{prettify_error, ParserError};

use slipform_core::span::Span;

use crate::nodes::{
    BinaryOp, BoolOp, CompOp, ConstantKind, Node, NodeId, ParamKind, Tree, UnaryOp,
};
use crate::tokenizer::{tokenize, TokType, Token};

type Result<T> = std::result::Result<T, ParserError>;

/// Keywords that can never be used as names.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Statement keywords the grammar does not cover.
const UNSUPPORTED_STATEMENTS: &[(&str, &str)] = &[
    ("class", "class definition"),
    ("with", "with statement"),
    ("try", "try statement"),
    ("import", "import statement"),
    ("from", "import statement"),
    ("global", "global declaration"),
    ("nonlocal", "nonlocal declaration"),
    ("del", "del statement"),
];

/// Parse a module. The returned tree has its root set; parent links are not
/// established until [`Tree::link_parents`] runs.
pub fn parse_module(source: &str) -> Result<Tree> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let root = parser.module()?;
    let mut tree = parser.tree;
    tree.set_root(root);
    Ok(tree)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    prev_end: usize,
    tree: Tree,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Parser {
            tokens,
            pos: 0,
            prev_end: 0,
            tree: Tree::new(),
        }
    }

    // ---- token helpers -------------------------------------------------

    fn peek(&self) -> Token<'a> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Token<'a> {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens[(self.pos + n).min(last)]
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.peek();
        if tok.kind != TokType::EndMarker {
            self.pos += 1;
        }
        self.prev_end = tok.end;
        tok
    }

    fn at_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    fn at_kw(&self, kw: &str) -> bool {
        self.peek().is_keyword(kw)
    }

    fn at_kind(&self, kind: TokType) -> bool {
        self.peek().kind == kind
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.at_op(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.at_kw(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<Token<'a>> {
        if self.at_op(op) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{op}'")))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<Token<'a>> {
        if self.at_kw(kw) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{kw}'")))
        }
    }

    fn expect_kind(&mut self, kind: TokType, expected: &str) -> Result<Token<'a>> {
        if self.at_kind(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_name(&mut self) -> Result<Token<'a>> {
        let tok = self.peek();
        if tok.kind == TokType::Name && !KEYWORDS.contains(&tok.text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected("a name"))
        }
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        let tok = self.peek();
        ParserError::UnexpectedToken {
            expected: expected.to_string(),
            found: describe(&tok),
            span: Span::new(tok.start, tok.end),
        }
    }

    fn unsupported(&self, what: &str, tok: Token<'_>) -> ParserError {
        ParserError::Unsupported {
            what: what.to_string(),
            span: Span::new(tok.start, tok.end),
        }
    }

    fn alloc(&mut self, node: Node, start: usize) -> NodeId {
        let end = self.prev_end.max(start);
        self.tree.alloc_spanned(node, Span::new(start, end))
    }

    // ---- statements ----------------------------------------------------

    fn module(&mut self) -> Result<NodeId> {
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokType::EndMarker => break,
                TokType::Newline => {
                    self.bump();
                }
                _ => body.extend(self.statement()?),
            }
        }
        Ok(self.alloc(Node::Module { body }, 0))
    }

    /// One logical line, or one compound statement. Simple statements
    /// joined by `;` produce several nodes.
    fn statement(&mut self) -> Result<Vec<NodeId>> {
        let tok = self.peek();
        match tok.kind {
            TokType::Comment => {
                self.bump();
                let id = self.alloc(
                    Node::Comment {
                        text: tok.text.to_string(),
                    },
                    tok.start,
                );
                self.expect_kind(TokType::Newline, "newline")?;
                return Ok(vec![id]);
            }
            TokType::Indent => return Err(self.unexpected("a statement")),
            _ => {}
        }
        if tok.is_op("@") {
            return Ok(vec![self.decorated()?]);
        }
        if tok.kind == TokType::Name {
            match tok.text {
                "def" => return Ok(vec![self.funcdef(Vec::new(), tok.start)?]),
                "if" => return Ok(vec![self.if_stmt(false)?]),
                "for" => return Ok(vec![self.for_stmt(tok.start, false)?]),
                "while" => return Ok(vec![self.while_stmt()?]),
                "async" => {
                    let next = self.peek_at(1);
                    if next.is_keyword("def") {
                        return Ok(vec![self.funcdef(Vec::new(), tok.start)?]);
                    }
                    if next.is_keyword("for") {
                        self.bump();
                        return Ok(vec![self.for_stmt(tok.start, true)?]);
                    }
                    return Err(self.unsupported("async statement", tok));
                }
                _ => {}
            }
            if let Some((_, what)) = UNSUPPORTED_STATEMENTS.iter().find(|(kw, _)| *kw == tok.text)
            {
                return Err(self.unsupported(what, tok));
            }
        }
        self.simple_statements()
    }

    fn simple_statements(&mut self) -> Result<Vec<NodeId>> {
        let mut stmts = vec![self.simple_statement()?];
        while self.eat_op(";") {
            if matches!(self.peek().kind, TokType::Newline | TokType::Comment) {
                break;
            }
            stmts.push(self.simple_statement()?);
        }
        if self.at_kind(TokType::Comment) {
            let comment = self.bump();
            if let Some(last) = stmts.last() {
                self.tree.set_trailing_comment(*last, comment.text);
            }
        }
        self.expect_kind(TokType::Newline, "newline")?;
        Ok(stmts)
    }

    fn simple_statement(&mut self) -> Result<NodeId> {
        let tok = self.peek();
        let start = tok.start;
        if tok.kind == TokType::Name {
            match tok.text {
                "pass" => {
                    self.bump();
                    return Ok(self.alloc(Node::Pass, start));
                }
                "break" => {
                    self.bump();
                    return Ok(self.alloc(Node::Break, start));
                }
                "continue" => {
                    self.bump();
                    return Ok(self.alloc(Node::Continue, start));
                }
                "return" => {
                    self.bump();
                    let value = if self.at_statement_end() {
                        None
                    } else {
                        Some(self.testlist_star_expr()?)
                    };
                    return Ok(self.alloc(Node::Return { value }, start));
                }
                "raise" => {
                    self.bump();
                    let mut exc = None;
                    let mut cause = None;
                    if !self.at_statement_end() {
                        exc = Some(self.test()?);
                        if self.eat_kw("from") {
                            cause = Some(self.test()?);
                        }
                    }
                    return Ok(self.alloc(Node::Raise { exc, cause }, start));
                }
                "assert" => {
                    self.bump();
                    let test = self.test()?;
                    let msg = if self.eat_op(",") {
                        Some(self.test()?)
                    } else {
                        None
                    };
                    return Ok(self.alloc(Node::Assert { test, msg }, start));
                }
                _ => {}
            }
            if let Some((_, what)) = UNSUPPORTED_STATEMENTS.iter().find(|(kw, _)| *kw == tok.text)
            {
                return Err(self.unsupported(what, tok));
            }
        }
        self.expr_statement()
    }

    fn at_statement_end(&self) -> bool {
        let tok = self.peek();
        matches!(
            tok.kind,
            TokType::Newline | TokType::Comment | TokType::EndMarker
        ) || tok.is_op(";")
    }

    fn expr_statement(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let first = self.testlist_star_expr()?;

        if self.at_op("=") {
            let mut targets = vec![first];
            let mut value;
            loop {
                self.expect_op("=")?;
                self.reject_yield()?;
                value = self.testlist_star_expr()?;
                if self.at_op("=") {
                    targets.push(value);
                } else {
                    break;
                }
            }
            for target in &targets {
                self.validate_target(*target)?;
            }
            return Ok(self.alloc(Node::Assign { targets, value }, start));
        }

        let tok = self.peek();
        if tok.kind == TokType::Op {
            if let Some(op) = BinaryOp::from_augmented_token(tok.text) {
                self.check_single_target(first)?;
                self.bump();
                self.reject_yield()?;
                let value = self.testlist()?;
                return Ok(self.alloc(
                    Node::AugAssign {
                        target: first,
                        op,
                        value,
                    },
                    start,
                ));
            }
            if tok.text == ":" {
                self.check_single_target(first)?;
                self.bump();
                let annotation = self.test()?;
                let value = if self.eat_op("=") {
                    self.reject_yield()?;
                    Some(self.testlist_star_expr()?)
                } else {
                    None
                };
                return Ok(self.alloc(
                    Node::AnnAssign {
                        target: first,
                        annotation,
                        value,
                    },
                    start,
                ));
            }
            if tok.text == ":=" {
                return Err(self.unsupported("assignment expression", tok));
            }
        }

        Ok(self.alloc(Node::ExprStmt { value: first }, start))
    }

    fn reject_yield(&self) -> Result<()> {
        let tok = self.peek();
        if tok.is_keyword("yield") {
            return Err(self.unsupported("yield expression", tok));
        }
        Ok(())
    }

    /// Targets of augmented and annotated assignment: a single name,
    /// attribute or subscript.
    fn check_single_target(&self, target: NodeId) -> Result<()> {
        match self.tree.node(target) {
            Node::Name { .. } | Node::Attribute { .. } | Node::Subscript { .. } => Ok(()),
            other => Err(ParserError::InvalidTarget {
                what: describe_node(other).to_string(),
                span: self.tree.span(target).unwrap_or_default(),
            }),
        }
    }

    fn validate_target(&self, target: NodeId) -> Result<()> {
        match self.tree.node(target) {
            Node::Name { .. } | Node::Attribute { .. } | Node::Subscript { .. } => Ok(()),
            Node::Tuple { elts, .. } | Node::List { elts } => {
                let mut starred = 0;
                for elt in elts {
                    if matches!(self.tree.node(*elt), Node::Starred { .. }) {
                        starred += 1;
                    }
                    self.validate_target(*elt)?;
                }
                if starred > 1 {
                    return Err(ParserError::InvalidTarget {
                        what: "multiple starred expressions".to_string(),
                        span: self.tree.span(target).unwrap_or_default(),
                    });
                }
                Ok(())
            }
            Node::Starred { value } => self.validate_target(*value),
            other => Err(ParserError::InvalidTarget {
                what: describe_node(other).to_string(),
                span: self.tree.span(target).unwrap_or_default(),
            }),
        }
    }

    fn decorated(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let mut decorators = Vec::new();
        while self.at_op("@") {
            let at = self.bump();
            let expr = self.test()?;
            let deco = self.alloc(Node::Decorator { expr }, at.start);
            if self.at_kind(TokType::Comment) {
                let comment = self.bump();
                self.tree.set_trailing_comment(deco, comment.text);
            }
            self.expect_kind(TokType::Newline, "newline")?;
            decorators.push(deco);
        }
        let tok = self.peek();
        if tok.is_keyword("def") || (tok.is_keyword("async") && self.peek_at(1).is_keyword("def"))
        {
            return self.funcdef(decorators, start);
        }
        if tok.is_keyword("class") {
            return Err(self.unsupported("class definition", tok));
        }
        Err(self.unexpected("'def'"))
    }

    fn funcdef(&mut self, decorators: Vec<NodeId>, start: usize) -> Result<NodeId> {
        let is_async = self.eat_kw("async");
        self.expect_kw("def")?;
        let name = self.expect_name()?.text.to_string();
        let params_start = self.expect_op("(")?.start;
        let params = self.parameters(params_start)?;
        let returns = if self.eat_op("->") {
            Some(self.test()?)
        } else {
            None
        };
        self.expect_op(":")?;
        let body = self.suite()?;
        Ok(self.alloc(
            Node::FunctionDef {
                name,
                is_async,
                decorators,
                params,
                returns,
                body,
            },
            start,
        ))
    }

    fn parameters(&mut self, start: usize) -> Result<NodeId> {
        let mut params: Vec<NodeId> = Vec::new();
        let mut keyword_only = false;
        let mut seen_slash = false;
        let mut seen_kwargs = false;
        while !self.at_op(")") {
            if seen_kwargs {
                return Err(self.unexpected("')'"));
            }
            let tok = self.peek();
            if self.eat_op("/") {
                if seen_slash || keyword_only || params.is_empty() {
                    return Err(self.unexpected("a parameter"));
                }
                seen_slash = true;
                for param in &params {
                    if let Node::Param { kind, .. } = self.tree.node_mut(*param) {
                        *kind = ParamKind::PositionalOnly;
                    }
                }
            } else if self.eat_op("**") {
                let param = self.param(ParamKind::VarKeyword, tok.start, false)?;
                params.push(param);
                seen_kwargs = true;
            } else if self.eat_op("*") {
                if keyword_only {
                    return Err(self.unexpected("a parameter"));
                }
                keyword_only = true;
                if self.at_kind(TokType::Name) {
                    let param = self.param(ParamKind::VarPositional, tok.start, false)?;
                    params.push(param);
                } else if self.at_op(")") || self.peek_at(1).is_op(")") {
                    // A bare `*` must be followed by a keyword-only parameter.
                    return Err(self.unexpected("a keyword-only parameter"));
                }
            } else {
                let kind = if keyword_only {
                    ParamKind::KeywordOnly
                } else {
                    ParamKind::Regular
                };
                let param = self.param(kind, tok.start, true)?;
                params.push(param);
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(")")?;
        Ok(self.alloc(Node::Parameters { params }, start))
    }

    fn param(&mut self, kind: ParamKind, start: usize, allow_default: bool) -> Result<NodeId> {
        let name = self.expect_name()?.text.to_string();
        let annotation = if self.eat_op(":") {
            Some(self.test()?)
        } else {
            None
        };
        let default = if allow_default && self.eat_op("=") {
            Some(self.test()?)
        } else {
            None
        };
        Ok(self.alloc(
            Node::Param {
                name,
                kind,
                annotation,
                default,
            },
            start,
        ))
    }

    /// The body after a `:`. Either an indented block or simple statements
    /// on the same line. A comment on the header line is kept as the block's
    /// trailing comment.
    fn suite(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        if !matches!(self.peek().kind, TokType::Newline | TokType::Comment) {
            let body = self.simple_statements()?;
            return Ok(self.alloc(Node::Block { body }, start));
        }
        let header_comment = if self.at_kind(TokType::Comment) {
            Some(self.bump().text)
        } else {
            None
        };
        self.expect_kind(TokType::Newline, "newline")?;

        let mut body = Vec::new();
        while self.at_kind(TokType::Comment) {
            let tok = self.bump();
            let id = self.alloc(
                Node::Comment {
                    text: tok.text.to_string(),
                },
                tok.start,
            );
            self.expect_kind(TokType::Newline, "newline")?;
            body.push(id);
        }
        self.expect_kind(TokType::Indent, "an indented block")?;
        loop {
            match self.peek().kind {
                TokType::Dedent | TokType::EndMarker => break,
                TokType::Newline => {
                    self.bump();
                }
                _ => body.extend(self.statement()?),
            }
        }
        self.expect_kind(TokType::Dedent, "dedent")?;
        let block = self.alloc(Node::Block { body }, start);
        if let Some(text) = header_comment {
            self.tree.set_trailing_comment(block, text);
        }
        Ok(block)
    }

    fn if_stmt(&mut self, is_elif: bool) -> Result<NodeId> {
        let start = self.bump().start;
        let test = self.namedexpr_test()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = if self.at_kw("elif") {
            let block_start = self.peek().start;
            let nested = self.if_stmt(true)?;
            Some(self.alloc(Node::Block { body: vec![nested] }, block_start))
        } else if self.eat_kw("else") {
            self.expect_op(":")?;
            Some(self.suite()?)
        } else {
            None
        };
        Ok(self.alloc(
            Node::If {
                test,
                body,
                orelse,
                is_elif,
            },
            start,
        ))
    }

    fn for_stmt(&mut self, start: usize, is_async: bool) -> Result<NodeId> {
        self.expect_kw("for")?;
        let target = self.exprlist()?;
        self.validate_target(target)?;
        self.expect_kw("in")?;
        let iter = self.testlist()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = self.else_suite()?;
        Ok(self.alloc(
            Node::For {
                is_async,
                target,
                iter,
                body,
                orelse,
            },
            start,
        ))
    }

    fn while_stmt(&mut self) -> Result<NodeId> {
        let start = self.bump().start;
        let test = self.namedexpr_test()?;
        self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = self.else_suite()?;
        Ok(self.alloc(Node::While { test, body, orelse }, start))
    }

    fn else_suite(&mut self) -> Result<Option<NodeId>> {
        if self.eat_kw("else") {
            self.expect_op(":")?;
            Ok(Some(self.suite()?))
        } else {
            Ok(None)
        }
    }

    // ---- expressions ---------------------------------------------------

    fn namedexpr_test(&mut self) -> Result<NodeId> {
        let expr = self.test()?;
        let tok = self.peek();
        if tok.is_op(":=") {
            return Err(self.unsupported("assignment expression", tok));
        }
        Ok(expr)
    }

    /// Comma-separated list at statement level; commas build a bare tuple.
    fn testlist_star_expr(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let first = self.star_or_test()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_tuple_end() {
                break;
            }
            elts.push(self.star_or_test()?);
        }
        Ok(self.alloc(
            Node::Tuple {
                elts,
                parenthesized: false,
            },
            start,
        ))
    }

    fn testlist(&mut self) -> Result<NodeId> {
        self.testlist_star_expr()
    }

    /// Loop targets: expressions above comparison level so `in` is not
    /// consumed.
    fn exprlist(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let first = self.star_or_expr()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_kw("in") {
                break;
            }
            elts.push(self.star_or_expr()?);
        }
        Ok(self.alloc(
            Node::Tuple {
                elts,
                parenthesized: false,
            },
            start,
        ))
    }

    fn at_tuple_end(&self) -> bool {
        let tok = self.peek();
        if self.at_statement_end() {
            return true;
        }
        tok.kind == TokType::Op
            && (matches!(tok.text, "=" | ")" | "]" | "}" | ":")
                || BinaryOp::from_augmented_token(tok.text).is_some())
    }

    fn star_or_test(&mut self) -> Result<NodeId> {
        if self.at_op("*") {
            let start = self.bump().start;
            let value = self.bitwise_or()?;
            return Ok(self.alloc(Node::Starred { value }, start));
        }
        self.test()
    }

    fn star_or_expr(&mut self) -> Result<NodeId> {
        if self.at_op("*") {
            let start = self.bump().start;
            let value = self.bitwise_or()?;
            return Ok(self.alloc(Node::Starred { value }, start));
        }
        self.bitwise_or()
    }

    fn test(&mut self) -> Result<NodeId> {
        let tok = self.peek();
        if tok.is_keyword("lambda") {
            return Err(self.unsupported("lambda expression", tok));
        }
        let start = tok.start;
        let body = self.or_test()?;
        if !self.at_kw("if") {
            return Ok(body);
        }
        self.bump();
        let test = self.or_test()?;
        self.expect_kw("else")?;
        let orelse = self.test()?;
        Ok(self.alloc(Node::IfExp { test, body, orelse }, start))
    }

    fn or_test(&mut self) -> Result<NodeId> {
        self.bool_chain(BoolOp::Or)
    }

    fn bool_chain(&mut self, op: BoolOp) -> Result<NodeId> {
        let start = self.peek().start;
        let first = match op {
            BoolOp::Or => self.bool_chain(BoolOp::And)?,
            BoolOp::And => self.not_test()?,
        };
        if !self.at_kw(op.as_str()) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(op.as_str()) {
            let next = match op {
                BoolOp::Or => self.bool_chain(BoolOp::And)?,
                BoolOp::And => self.not_test()?,
            };
            values.push(next);
        }
        Ok(self.alloc(Node::BoolOp { op, values }, start))
    }

    fn not_test(&mut self) -> Result<NodeId> {
        if self.at_kw("not") {
            let start = self.bump().start;
            let operand = self.not_test()?;
            return Ok(self.alloc(
                Node::UnaryOp {
                    op: UnaryOp::Not,
                    operand,
                },
                start,
            ));
        }
        self.comparison()
    }

    fn comp_op(&mut self) -> Option<CompOp> {
        let tok = self.peek();
        if tok.is_keyword("not") && self.peek_at(1).is_keyword("in") {
            self.bump();
            self.bump();
            return Some(CompOp::NotIn);
        }
        if tok.is_keyword("is") {
            self.bump();
            if self.eat_kw("not") {
                return Some(CompOp::IsNot);
            }
            return Some(CompOp::Is);
        }
        if tok.kind == TokType::Op || tok.is_keyword("in") {
            if let Some(op) = CompOp::from_token(tok.text) {
                self.bump();
                return Some(op);
            }
        }
        None
    }

    fn comparison(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let left = self.bitwise_or()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.comp_op() {
            ops.push(op);
            comparators.push(self.bitwise_or()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(self.alloc(
            Node::Compare {
                left,
                ops,
                comparators,
            },
            start,
        ))
    }

    fn binary_level(&mut self, ops: &[&str], next: fn(&mut Self) -> Result<NodeId>) -> Result<NodeId> {
        let start = self.peek().start;
        let mut left = next(self)?;
        loop {
            let tok = self.peek();
            if tok.kind != TokType::Op || !ops.contains(&tok.text) {
                return Ok(left);
            }
            let Some(op) = BinaryOp::from_token(tok.text) else {
                return Ok(left);
            };
            self.bump();
            let right = next(self)?;
            left = self.alloc(Node::BinOp { left, op, right }, start);
        }
    }

    fn bitwise_or(&mut self) -> Result<NodeId> {
        self.binary_level(&["|"], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> Result<NodeId> {
        self.binary_level(&["^"], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> Result<NodeId> {
        self.binary_level(&["&"], Self::shift_expr)
    }

    fn shift_expr(&mut self) -> Result<NodeId> {
        self.binary_level(&["<<", ">>"], Self::arith_expr)
    }

    fn arith_expr(&mut self) -> Result<NodeId> {
        self.binary_level(&["+", "-"], Self::term)
    }

    fn term(&mut self) -> Result<NodeId> {
        self.binary_level(&["*", "/", "//", "%", "@"], Self::factor)
    }

    fn factor(&mut self) -> Result<NodeId> {
        let tok = self.peek();
        let op = match tok.text {
            "+" if tok.kind == TokType::Op => Some(UnaryOp::Plus),
            "-" if tok.kind == TokType::Op => Some(UnaryOp::Minus),
            "~" if tok.kind == TokType::Op => Some(UnaryOp::Invert),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.factor()?;
            return Ok(self.alloc(Node::UnaryOp { op, operand }, tok.start));
        }
        self.power()
    }

    fn power(&mut self) -> Result<NodeId> {
        let tok = self.peek();
        if tok.is_keyword("await") {
            return Err(self.unsupported("await expression", tok));
        }
        let left = self.primary()?;
        if self.eat_op("**") {
            let right = self.factor()?;
            return Ok(self.alloc(
                Node::BinOp {
                    left,
                    op: BinaryOp::Pow,
                    right,
                },
                tok.start,
            ));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let mut expr = self.atom()?;
        loop {
            if self.eat_op(".") {
                let attr = self.expect_name()?.text.to_string();
                expr = self.alloc(Node::Attribute { value: expr, attr }, start);
            } else if self.eat_op("(") {
                let args = self.call_args()?;
                self.expect_op(")")?;
                expr = self.alloc(Node::Call { func: expr, args }, start);
            } else if self.at_op("[") {
                self.bump();
                let slice = self.subscript_list()?;
                self.expect_op("]")?;
                expr = self.alloc(Node::Subscript { value: expr, slice }, start);
            } else {
                return Ok(expr);
            }
        }
    }

    fn call_args(&mut self) -> Result<Vec<NodeId>> {
        let mut args = Vec::new();
        while !self.at_op(")") {
            let tok = self.peek();
            let arg = if self.eat_op("**") {
                let value = self.test()?;
                self.alloc(Node::DoubleStarred { value }, tok.start)
            } else if self.eat_op("*") {
                let value = self.test()?;
                self.alloc(Node::Starred { value }, tok.start)
            } else if tok.kind == TokType::Name
                && !KEYWORDS.contains(&tok.text)
                && self.peek_at(1).is_op("=")
            {
                self.bump();
                self.bump();
                let value = self.test()?;
                self.alloc(
                    Node::Keyword {
                        arg: tok.text.to_string(),
                        value,
                    },
                    tok.start,
                )
            } else {
                let value = self.namedexpr_test()?;
                self.reject_comprehension()?;
                value
            };
            args.push(arg);
            if !self.eat_op(",") {
                break;
            }
        }
        Ok(args)
    }

    fn reject_comprehension(&self) -> Result<()> {
        let tok = self.peek();
        if tok.is_keyword("for") || tok.is_keyword("async") {
            return Err(self.unsupported("comprehension", tok));
        }
        Ok(())
    }

    fn subscript_list(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let first = self.subscript()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op("]") {
                break;
            }
            elts.push(self.subscript()?);
        }
        Ok(self.alloc(
            Node::Tuple {
                elts,
                parenthesized: false,
            },
            start,
        ))
    }

    fn subscript(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let lower = if self.at_op(":") {
            None
        } else {
            let expr = self.test()?;
            if !self.at_op(":") {
                return Ok(expr);
            }
            Some(expr)
        };
        self.expect_op(":")?;
        let ends_part = |p: &Self| p.at_op(":") || p.at_op(",") || p.at_op("]");
        let upper = if ends_part(self) {
            None
        } else {
            Some(self.test()?)
        };
        let step = if self.eat_op(":") {
            if ends_part(self) {
                None
            } else {
                Some(self.test()?)
            }
        } else {
            None
        };
        Ok(self.alloc(Node::Slice { lower, upper, step }, start))
    }

    fn atom(&mut self) -> Result<NodeId> {
        let tok = self.peek();
        let start = tok.start;
        match tok.kind {
            TokType::Name => {
                let kind = match tok.text {
                    "True" => Some(ConstantKind::True),
                    "False" => Some(ConstantKind::False),
                    "None" => Some(ConstantKind::None),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.bump();
                    return Ok(self.alloc(
                        Node::Constant {
                            kind,
                            raw: tok.text.to_string(),
                        },
                        start,
                    ));
                }
                match tok.text {
                    "lambda" => return Err(self.unsupported("lambda expression", tok)),
                    "yield" => return Err(self.unsupported("yield expression", tok)),
                    "await" => return Err(self.unsupported("await expression", tok)),
                    _ => {}
                }
                let name = self.expect_name()?;
                Ok(self.alloc(
                    Node::Name {
                        id: name.text.to_string(),
                    },
                    start,
                ))
            }
            TokType::Number => {
                self.bump();
                Ok(self.alloc(
                    Node::Constant {
                        kind: number_kind(tok.text),
                        raw: tok.text.to_string(),
                    },
                    start,
                ))
            }
            TokType::String | TokType::FString => self.strings(),
            TokType::Op => match tok.text {
                "(" => self.paren(),
                "[" => self.list(),
                "{" => self.brace(),
                "..." => {
                    self.bump();
                    Ok(self.alloc(
                        Node::Constant {
                            kind: ConstantKind::Ellipsis,
                            raw: "...".to_string(),
                        },
                        start,
                    ))
                }
                _ => Err(self.unexpected("an expression")),
            },
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Adjacent string literals concatenate into one node.
    fn strings(&mut self) -> Result<NodeId> {
        let start = self.peek().start;
        let mut parts = Vec::new();
        let mut formatted = false;
        let mut bytes = false;
        while matches!(self.peek().kind, TokType::String | TokType::FString) {
            let tok = self.bump();
            formatted |= tok.kind == TokType::FString;
            bytes |= string_prefix(tok.text).to_ascii_lowercase().contains('b');
            parts.push(tok.text);
        }
        let raw = parts.join(" ");
        let node = if formatted {
            Node::FormattedString { raw }
        } else {
            Node::Constant {
                kind: if bytes {
                    ConstantKind::Bytes
                } else {
                    ConstantKind::Str
                },
                raw,
            }
        };
        Ok(self.alloc(node, start))
    }

    fn paren(&mut self) -> Result<NodeId> {
        let start = self.bump().start;
        if self.eat_op(")") {
            return Ok(self.alloc(
                Node::Tuple {
                    elts: Vec::new(),
                    parenthesized: true,
                },
                start,
            ));
        }
        self.reject_yield()?;
        let first = self.star_or_namedexpr()?;
        self.reject_comprehension()?;
        if self.eat_op(")") {
            if matches!(self.tree.node(first), Node::Starred { .. }) {
                return Err(ParserError::InvalidTarget {
                    what: "starred expression".to_string(),
                    span: self.tree.span(first).unwrap_or_default(),
                });
            }
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat_op(",") {
            if self.at_op(")") {
                break;
            }
            elts.push(self.star_or_namedexpr()?);
        }
        self.expect_op(")")?;
        Ok(self.alloc(
            Node::Tuple {
                elts,
                parenthesized: true,
            },
            start,
        ))
    }

    fn star_or_namedexpr(&mut self) -> Result<NodeId> {
        if self.at_op("*") {
            return self.star_or_test();
        }
        self.namedexpr_test()
    }

    fn list(&mut self) -> Result<NodeId> {
        let start = self.bump().start;
        let elts = self.display_items("]")?;
        Ok(self.alloc(Node::List { elts }, start))
    }

    fn display_items(&mut self, close: &str) -> Result<Vec<NodeId>> {
        let mut elts = Vec::new();
        while !self.at_op(close) {
            elts.push(self.star_or_namedexpr()?);
            if elts.len() == 1 {
                self.reject_comprehension()?;
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(close)?;
        Ok(elts)
    }

    fn brace(&mut self) -> Result<NodeId> {
        let start = self.bump().start;
        if self.eat_op("}") {
            return Ok(self.alloc(
                Node::Dict {
                    entries: Vec::new(),
                },
                start,
            ));
        }
        let is_dict = self.at_op("**") || {
            // Look for a top-level `:` after the first item.
            let checkpoint = (self.pos, self.prev_end);
            let len = self.tree.len();
            let first = self.test();
            let dict = first.is_ok() && self.at_op(":");
            self.pos = checkpoint.0;
            self.prev_end = checkpoint.1;
            self.tree_truncate(len);
            dict
        };
        if !is_dict {
            let elts = self.display_items("}")?;
            return Ok(self.alloc(Node::Set { elts }, start));
        }
        let mut entries = Vec::new();
        while !self.at_op("}") {
            let tok = self.peek();
            let entry = if self.eat_op("**") {
                let value = self.bitwise_or()?;
                self.alloc(Node::DoubleStarred { value }, tok.start)
            } else {
                let key = self.test()?;
                self.expect_op(":")?;
                let value = self.test()?;
                self.alloc(Node::DictEntry { key, value }, tok.start)
            };
            entries.push(entry);
            if entries.len() == 1 {
                self.reject_comprehension()?;
            }
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op("}")?;
        Ok(self.alloc(Node::Dict { entries }, start))
    }

    /// Drop nodes allocated by an abandoned lookahead.
    fn tree_truncate(&mut self, len: usize) {
        self.tree.truncate(len);
    }
}

fn number_kind(text: &str) -> ConstantKind {
    let lower = text.to_ascii_lowercase();
    if lower.ends_with('j') {
        ConstantKind::Imaginary
    } else if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        ConstantKind::Int
    } else if lower.contains('.') || lower.contains('e') {
        ConstantKind::Float
    } else {
        ConstantKind::Int
    }
}

fn string_prefix(text: &str) -> &str {
    let end = text.find(['\'', '"']).unwrap_or(0);
    &text[..end]
}

fn describe(tok: &Token<'_>) -> String {
    match tok.kind {
        TokType::Newline | TokType::Indent | TokType::Dedent | TokType::EndMarker => {
            tok.kind.to_string()
        }
        _ => format!("'{}'", tok.text),
    }
}

fn describe_node(node: &Node) -> &'static str {
    match node {
        Node::Call { .. } => "function call",
        Node::Constant { .. } | Node::FormattedString { .. } => "literal",
        Node::BinOp { .. } | Node::UnaryOp { .. } => "expression",
        Node::BoolOp { .. } => "boolean expression",
        Node::Compare { .. } => "comparison",
        Node::IfExp { .. } => "conditional expression",
        Node::Dict { .. } => "dict display",
        Node::Set { .. } => "set display",
        Node::Keyword { .. } | Node::DoubleStarred { .. } => "keyword argument",
        Node::Slice { .. } => "slice",
        _ => "expression",
    }
}
