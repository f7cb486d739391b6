//! Binding registration.
//!
//! After each assignment to plain names, one `name.<announce>('name')`
//! statement per bound name is inserted, in the order the names appear in the
//! target.

use slipform_cst::visitor::{RewriteError, Transformer, VisitOutcome};
use slipform_cst::{Node, NodeId, Tree};
use tracing::trace;

use super::announce_statement;
use crate::options::TranslateOptions;
use crate::scope::{Scope, ScopeOrigin};

/// Collect the plain names bound by an assignment target, left to right.
///
/// Tuples, lists and starred targets are descended. Attribute and subscript
/// targets bind nothing by name and contribute nothing.
pub fn flatten_target(tree: &Tree, target: NodeId, out: &mut Vec<String>) {
    match tree.get(target) {
        Some(Node::Name { id }) => out.push(id.clone()),
        Some(Node::Tuple { elts, .. } | Node::List { elts }) => {
            for elt in elts {
                flatten_target(tree, *elt, out);
            }
        }
        Some(Node::Starred { value }) => flatten_target(tree, *value, out),
        _ => {}
    }
}

#[derive(Debug)]
pub struct RegisterBindings<'o> {
    options: &'o TranslateOptions,
    scope: Scope,
    announced: usize,
}

impl<'o> RegisterBindings<'o> {
    /// Start from a scope that already holds the parameters.
    pub fn new(options: &'o TranslateOptions, scope: Scope) -> Self {
        Self {
            options,
            scope,
            announced: 0,
        }
    }

    /// Announce statements inserted so far.
    pub fn announced(&self) -> usize {
        self.announced
    }

    pub fn into_scope(self) -> Scope {
        self.scope
    }

    fn record(&mut self, names: &[String]) {
        for name in names {
            self.scope.insert(name, ScopeOrigin::LocalBinding);
        }
    }

    /// Insert announcements for `names` after `anchor`, keeping their order.
    fn announce_after(
        &mut self,
        tree: &mut Tree,
        anchor: NodeId,
        names: &[String],
    ) -> Result<(), RewriteError> {
        self.record(names);
        let announced: Vec<&String> = names
            .iter()
            .filter(|name| self.options.is_announced(name))
            .collect();
        for name in announced.into_iter().rev() {
            trace!(%anchor, name = %name, "announcing binding");
            let stmt = announce_statement(tree, name, &self.options.announce_method);
            tree.insert_after(anchor, stmt)?;
            self.announced += 1;
        }
        Ok(())
    }
}

impl Transformer for RegisterBindings<'_> {
    fn pass_name(&self) -> &'static str {
        "register-bindings"
    }

    fn visit_assign(&mut self, tree: &mut Tree, node: NodeId) -> Result<VisitOutcome, RewriteError> {
        let Some(Node::Assign { targets, .. }) = tree.get(node) else {
            return Ok(VisitOutcome::skip_children());
        };
        let mut names = Vec::new();
        for target in targets.clone() {
            flatten_target(tree, target, &mut names);
        }
        self.announce_after(tree, node, &names)?;
        Ok(VisitOutcome::skip_children())
    }

    fn visit_aug_assign(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        let Some(Node::AugAssign { target, .. }) = tree.get(node) else {
            return Ok(VisitOutcome::skip_children());
        };
        let mut names = Vec::new();
        flatten_target(tree, *target, &mut names);
        self.announce_after(tree, node, &names)?;
        Ok(VisitOutcome::skip_children())
    }

    fn visit_ann_assign(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        let Some(Node::AnnAssign {
            target,
            value: Some(_),
            ..
        }) = tree.get(node)
        else {
            return Ok(VisitOutcome::skip_children());
        };
        let mut names = Vec::new();
        flatten_target(tree, *target, &mut names);
        self.announce_after(tree, node, &names)?;
        Ok(VisitOutcome::skip_children())
    }

    fn visit_for_stmt(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        if let Some(Node::For { target, .. }) = tree.get(node) {
            let mut names = Vec::new();
            flatten_target(tree, *target, &mut names);
            self.record(&names);
        }
        Ok(VisitOutcome::unchanged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipform_cst::visitor::Dispatcher;
    use slipform_cst::{parse_linked, render};

    fn register(source: &str) -> (String, Scope) {
        let options = TranslateOptions::default();
        let (mut tree, root) = parse_linked(source).unwrap();
        let mut pass = RegisterBindings::new(&options, Scope::new());
        let report = Dispatcher::new().transform(&mut pass, &mut tree, root);
        assert!(!report.has_diagnostics());
        (render(&tree, root), pass.into_scope())
    }

    #[test]
    fn flattening_follows_source_order() {
        let (tree, root) = parse_linked("(a, [b, *c]), d.x, e[0], f = v\n").unwrap();
        let Some(Node::Assign { targets, .. }) = tree.get(tree.statements(root).unwrap()[0])
        else {
            panic!("expected an assignment");
        };
        let mut names = Vec::new();
        flatten_target(&tree, targets[0], &mut names);
        assert_eq!(names, vec!["a", "b", "c", "f"]);
    }

    #[test]
    fn announcements_keep_destructuring_order() {
        let (out, _) = register("a, (b, c) = v\n");
        assert_eq!(
            out,
            "a, (b, c) = v\na.set_name('a')\nb.set_name('b')\nc.set_name('c')\n"
        );
    }

    #[test]
    fn chained_targets_and_discards() {
        let (out, scope) = register("x = _tmp, y = pair\n");
        assert_eq!(out, "x = _tmp, y = pair\nx.set_name('x')\ny.set_name('y')\n");
        assert_eq!(scope.names(ScopeOrigin::LocalBinding), vec!["x", "_tmp", "y"]);
    }

    #[test]
    fn compound_targets_are_not_announced() {
        let source = "obj.attr = 1\nseq[0] = 1\n";
        let (out, scope) = register(source);
        assert_eq!(out, source);
        assert!(scope.is_empty());
    }

    #[test]
    fn augmented_and_annotated_assignments() {
        let (out, _) = register("t += 1\nu: int = 2\nw: int\n");
        assert_eq!(
            out,
            "t += 1\nt.set_name('t')\nu: int = 2\nu.set_name('u')\nw: int\n"
        );
    }

    #[test]
    fn loop_targets_are_recorded_not_announced() {
        let (out, scope) = register("for i, j in pairs:\n    k = i\n");
        assert_eq!(out, "for i, j in pairs:\n    k = i\n    k.set_name('k')\n");
        assert_eq!(scope.names(ScopeOrigin::LocalBinding), vec!["i", "j", "k"]);
    }
}
