// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Runs a [`Transformer`] over a tree and applies the rewrites it returns.
//!
//! Handler failures never abort the walk. Each one becomes a [`Diagnostic`]
//! in the returned [`TransformReport`], is logged at `warn`, and leaves the
//! node unchanged with its children unvisited.
//!
//! Directive comments are honored for every pass: a statement comment whose
//! payload is `[ignore]` suppresses dispatch for the next sibling statement
//! and its whole subtree.

use std::fmt;

use slipform_core::span::Span;
use tracing::{debug, trace, warn};

use super::directive::Directive;
use super::traits::{dispatch_handler, Rewrite, Transformer, VisitOutcome};
use super::walker::NodeIter;
use crate::nodes::{NodeId, NodeKind, Tree, TreeError};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A recoverable problem found while running a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub pass: &'static str,
    pub node: NodeId,
    pub kind: NodeKind,
    pub span: Option<Span>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} {}: {}",
            self.severity, self.pass, self.kind, self.node, self.message
        )
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub pass: &'static str,
    /// Nodes handed to a handler.
    pub visited: usize,
    /// Nodes replaced, deleted or spliced.
    pub rewritten: usize,
    /// Statements suppressed by directives.
    pub ignored: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformReport {
    fn new(pass: &'static str) -> Self {
        Self {
            pass,
            visited: 0,
            rewritten: 0,
            ignored: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Walks a tree and dispatches each node to the matching handler.
#[derive(Debug, Default)]
pub struct Dispatcher {
    skip_next: Option<NodeId>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `transformer` over the subtree at `root`.
    ///
    /// Parent links must be current for every node below `root`.
    pub fn transform<T: Transformer + ?Sized>(
        &mut self,
        transformer: &mut T,
        tree: &mut Tree,
        root: NodeId,
    ) -> TransformReport {
        self.skip_next = None;
        let pass = transformer.pass_name();
        let mut report = TransformReport::new(pass);
        let mut iter = NodeIter::new(root);

        while let Some(node) = iter.advance(tree) {
            let Some(kind) = tree.kind(node) else {
                iter.skip_children();
                continue;
            };

            if let Some(expected) = self.skip_next.take() {
                if expected != node {
                    debug!(pass, %expected, %node, "directive target moved");
                }
                trace!(pass, %node, %kind, "ignored by directive");
                report.ignored += 1;
                iter.skip_children();
                continue;
            }

            if kind == NodeKind::Comment {
                self.check_directive(tree, node, &mut report);
            }

            report.visited += 1;
            let parent = tree.parent(node);
            let outcome = match dispatch_handler(transformer, tree, node, kind) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(pass, %node, %kind, error = %err, "rewrite handler failed");
                    push_diagnostic(&mut report, tree, node, kind, Severity::Warning, err.to_string());
                    iter.skip_children();
                    continue;
                }
            };

            if let Err(err) = apply(tree, &mut iter, node, parent, outcome, &mut report) {
                warn!(pass, %node, %kind, error = %err, "rewrite could not be applied");
                push_diagnostic(&mut report, tree, node, kind, Severity::Error, err.to_string());
                iter.skip_children();
            }
        }

        debug!(
            pass,
            visited = report.visited,
            rewritten = report.rewritten,
            ignored = report.ignored,
            diagnostics = report.diagnostics.len(),
            "pass complete"
        );
        report
    }

    fn check_directive(&mut self, tree: &Tree, node: NodeId, report: &mut TransformReport) {
        let Some(text) = comment_text(tree, node) else {
            return;
        };
        if Directive::from_comment(text) != Some(Directive::IgnoreNext) {
            return;
        }
        match tree.next_sibling(node) {
            Some(target) => self.skip_next = Some(target),
            None => {
                let message = "ignore directive has no following statement".to_string();
                warn!(pass = report.pass, %node, "{message}");
                push_diagnostic(report, tree, node, NodeKind::Comment, Severity::Warning, message);
            }
        }
    }
}

fn comment_text(tree: &Tree, node: NodeId) -> Option<&str> {
    match tree.get(node)? {
        crate::nodes::Node::Comment { text } => Some(text),
        _ => None,
    }
}

fn push_diagnostic(
    report: &mut TransformReport,
    tree: &Tree,
    node: NodeId,
    kind: NodeKind,
    severity: Severity,
    message: String,
) {
    report.diagnostics.push(Diagnostic {
        severity,
        pass: report.pass,
        node,
        kind,
        span: tree.span(node),
        message,
    });
}

fn apply(
    tree: &mut Tree,
    iter: &mut NodeIter,
    node: NodeId,
    parent: Option<NodeId>,
    outcome: VisitOutcome,
    report: &mut TransformReport,
) -> Result<(), TreeError> {
    let VisitOutcome { rewrite, recurse } = outcome;
    match rewrite {
        Rewrite::Unchanged => {
            if !recurse {
                iter.skip_children();
            }
        }
        Rewrite::Replaced(new) => {
            if new != node {
                let parent = parent.ok_or(TreeError::Detached(node))?;
                tree.replace_child(parent, node, new)?;
                tree.link_parents(new);
                report.rewritten += 1;
            }
            iter.replace_current(new);
            if !recurse {
                iter.skip_children();
            }
        }
        Rewrite::Deleted => {
            let parent = parent.ok_or(TreeError::Detached(node))?;
            tree.remove_child(parent, node)?;
            report.rewritten += 1;
            iter.skip_children();
        }
        Rewrite::SplicedWith(nodes) => {
            let parent = parent.ok_or(TreeError::Detached(node))?;
            tree.splice_child(parent, node, &nodes)?;
            for id in nodes {
                tree.link_parents(id);
            }
            report.rewritten += 1;
            iter.skip_children();
        }
    }
    Ok(())
}
