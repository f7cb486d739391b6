use slipform_cst::visitor::{RewriteError, Transformer, VisitOutcome};
use slipform_cst::{CompOp, Node, NodeId, Tree};

use super::namespace_call;
use crate::options::TranslateOptions;

/// Rewrites `item in container` into `<namespace>.contains(container, item)`.
///
/// Chained comparisons are reported and left alone. Other single
/// comparisons are already graph operations and pass through.
#[derive(Debug)]
pub struct RewriteMembership<'o> {
    options: &'o TranslateOptions,
    rewritten: usize,
}

impl<'o> RewriteMembership<'o> {
    pub fn new(options: &'o TranslateOptions) -> Self {
        Self {
            options,
            rewritten: 0,
        }
    }

    pub fn rewritten(&self) -> usize {
        self.rewritten
    }
}

impl Transformer for RewriteMembership<'_> {
    fn pass_name(&self) -> &'static str {
        "rewrite-membership"
    }

    fn visit_compare(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        let Some(Node::Compare {
            left,
            ops,
            comparators,
        }) = tree.get(node)
        else {
            return Ok(VisitOutcome::unchanged());
        };
        let (item, container) = match (ops.as_slice(), comparators.as_slice()) {
            ([CompOp::In], [container]) => (*left, *container),
            ([_], [_]) => return Ok(VisitOutcome::unchanged()),
            _ => {
                return Err(RewriteError::ChainedComparison {
                    operators: ops.len(),
                })
            }
        };
        let call = namespace_call(tree, &self.options.namespace, "contains", vec![container, item]);
        self.rewritten += 1;
        Ok(VisitOutcome::replaced(call).with_recurse(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipform_cst::visitor::{Dispatcher, Severity};
    use slipform_cst::{parse_linked, render};

    #[test]
    fn swaps_operands() {
        let options = TranslateOptions::default();
        let (mut tree, root) = parse_linked("r = x in y\n").unwrap();
        let mut pass = RewriteMembership::new(&options);
        let report = Dispatcher::new().transform(&mut pass, &mut tree, root);
        assert_eq!(render(&tree, root), "r = graph.contains(y, x)\n");
        assert_eq!(report.rewritten, 1);
        assert!(!report.has_diagnostics());
    }

    #[test]
    fn nested_membership_is_rewritten() {
        let options = TranslateOptions::default();
        let (mut tree, root) = parse_linked("r = (a in b) in c\n").unwrap();
        let mut pass = RewriteMembership::new(&options);
        Dispatcher::new().transform(&mut pass, &mut tree, root);
        assert_eq!(
            render(&tree, root),
            "r = graph.contains(c, graph.contains(b, a))\n"
        );
        assert_eq!(pass.rewritten(), 2);
    }

    #[test]
    fn chained_comparison_is_reported() {
        let options = TranslateOptions::default();
        let source = "r = a < b < c\ns = a not in b\n";
        let (mut tree, root) = parse_linked(source).unwrap();
        let mut pass = RewriteMembership::new(&options);
        let report = Dispatcher::new().transform(&mut pass, &mut tree, root);
        assert_eq!(render(&tree, root), source);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, Severity::Warning);
        assert!(report.diagnostics[0].message.contains("chained comparison"));
    }
}
