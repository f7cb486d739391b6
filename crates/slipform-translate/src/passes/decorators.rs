use slipform_cst::visitor::{RewriteError, Transformer, VisitOutcome};
use slipform_cst::{NodeId, Tree};

/// Removes the decorators of one definition.
///
/// Decorators of nested definitions are left alone.
#[derive(Debug)]
pub struct StripDecorators {
    target: NodeId,
    stripped: usize,
}

impl StripDecorators {
    pub fn new(target: NodeId) -> Self {
        Self { target, stripped: 0 }
    }

    pub fn stripped(&self) -> usize {
        self.stripped
    }
}

impl Transformer for StripDecorators {
    fn pass_name(&self) -> &'static str {
        "strip-decorators"
    }

    fn visit_decorator(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
    ) -> Result<VisitOutcome, RewriteError> {
        if tree.parent(node) == Some(self.target) {
            self.stripped += 1;
            return Ok(VisitOutcome::deleted());
        }
        Ok(VisitOutcome::skip_children())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipform_cst::visitor::Dispatcher;
    use slipform_cst::{parse_linked, render, Node};

    #[test]
    fn strips_only_the_target() {
        let source = "@graphify\n@other(1)\ndef f(x):\n    @inner\n    def g():\n        pass\n    return x\n";
        let (mut tree, root) = parse_linked(source).unwrap();
        let def = tree.statements(root).unwrap()[0];
        let mut pass = StripDecorators::new(def);
        let report = Dispatcher::new().transform(&mut pass, &mut tree, root);

        assert_eq!(pass.stripped(), 2);
        assert_eq!(report.rewritten, 2);
        let Node::FunctionDef { decorators, .. } = tree.node(def) else {
            panic!("expected a definition");
        };
        assert!(decorators.is_empty());
        assert_eq!(
            render(&tree, root),
            "def f(x):\n    @inner\n    def g():\n        pass\n    return x\n"
        );
    }
}
