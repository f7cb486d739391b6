//! The [`Compiler`] that turns translated units into graph programs.

use slipform_core::text::byte_offset_to_position_str;
use slipform_cst::{parse_linked, Node, NodeId, NodeKind, Tree};
use slipform_translate::{Compiler, TranslateOptions, TranslatedUnit};
use tracing::debug;

use crate::error::{EvalError, GraphCompileError};
use crate::eval::Evaluator;
use crate::graph::Graph;

/// Statements the evaluator runs. Anything else is rejected at compile time.
const EVALUATED: &[NodeKind] = &[
    NodeKind::Assign,
    NodeKind::AugAssign,
    NodeKind::AnnAssign,
    NodeKind::ExprStmt,
    NodeKind::Return,
    NodeKind::Pass,
    NodeKind::Comment,
];

/// Compiles with the namespace and announce method used to translate.
#[derive(Debug, Clone, Default)]
pub struct GraphCompiler {
    options: TranslateOptions,
}

impl GraphCompiler {
    pub fn new(options: TranslateOptions) -> Self {
        Self { options }
    }

    /// Compile rendered unit text defining `unit_name`.
    pub fn compile_source(
        &self,
        unit_name: &str,
        text: &str,
    ) -> Result<GraphProgram, GraphCompileError> {
        let (tree, root) = parse_linked(text)?;
        let (params, body) = tree
            .statements(root)
            .unwrap_or_default()
            .iter()
            .find_map(|stmt| match tree.get(*stmt) {
                Some(Node::FunctionDef {
                    name, params, body, ..
                }) if name == unit_name => Some((*params, *body)),
                _ => None,
            })
            .ok_or_else(|| GraphCompileError::MissingDefinition {
                unit: unit_name.to_string(),
            })?;

        let count = tree.children(params).len();
        if count > 0 {
            return Err(GraphCompileError::Parameters { count });
        }
        for stmt in tree.statements(body).unwrap_or_default() {
            let Some(kind) = tree.kind(*stmt) else {
                continue;
            };
            if !EVALUATED.contains(&kind) {
                let offset = tree.span(*stmt).map_or(0, |span| span.start);
                let (line, _) = byte_offset_to_position_str(text, offset);
                return Err(GraphCompileError::UnsupportedStatement { kind, line });
            }
        }
        debug!(unit = unit_name, "compiled graph program");
        Ok(GraphProgram {
            unit_name: unit_name.to_string(),
            tree,
            body,
            namespace: self.options.namespace.clone(),
            announce_method: self.options.announce_method.clone(),
        })
    }
}

impl Compiler for GraphCompiler {
    type Artifact = GraphProgram;
    type Error = GraphCompileError;

    fn compile(&self, unit: &TranslatedUnit) -> Result<GraphProgram, GraphCompileError> {
        self.compile_source(unit.unit_name(), &unit.render_for_compile())
    }
}

/// A compiled unit, ready to be instantiated any number of times.
#[derive(Debug, Clone)]
pub struct GraphProgram {
    unit_name: String,
    tree: Tree,
    body: NodeId,
    namespace: String,
    announce_method: String,
}

impl GraphProgram {
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Evaluate the body in a fresh builder context and return its graph.
    pub fn instantiate(&self) -> Result<Graph, EvalError> {
        let graph = Evaluator::new(&self.tree, &self.namespace, &self.announce_method)
            .run(self.body)?;
        debug!(
            unit = %self.unit_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built"
        );
        Ok(graph)
    }
}
