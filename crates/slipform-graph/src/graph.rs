//! The dataflow graph built by evaluating a translated unit.
//!
//! Edges run from an input to the node consuming it and carry the argument
//! position, so operation inputs can be read back in call order.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

/// What a graph node computes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphNodeKind {
    /// A literal, kept as its source text.
    Constant { value: String },
    /// An external input.
    Placeholder { name: String },
    /// An operation over the node's inputs.
    Operation {
        op: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl GraphNodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GraphNodeKind::Constant { .. } => "constant",
            GraphNodeKind::Placeholder { .. } => "placeholder",
            GraphNodeKind::Operation { .. } => "operation",
        }
    }

    /// Literal text, placeholder name, or operation name with its detail.
    pub fn label(&self) -> String {
        match self {
            GraphNodeKind::Constant { value } => value.clone(),
            GraphNodeKind::Placeholder { name } => name.clone(),
            GraphNodeKind::Operation { op, detail: None } => op.clone(),
            GraphNodeKind::Operation {
                op,
                detail: Some(detail),
            } => format!("{op}.{detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    #[serde(flatten)]
    pub kind: GraphNodeKind,
    /// Binding name announced for this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A directed dataflow graph with ordered outputs.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<GraphNode, usize>,
    outputs: Vec<NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, kind: GraphNodeKind) -> NodeIndex {
        self.graph.add_node(GraphNode { kind, name: None })
    }

    pub fn add_constant(&mut self, value: impl Into<String>) -> NodeIndex {
        self.add(GraphNodeKind::Constant {
            value: value.into(),
        })
    }

    pub fn add_placeholder(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(GraphNodeKind::Placeholder { name: name.into() })
    }

    /// Add an operation consuming `inputs` in order.
    pub fn add_operation(
        &mut self,
        op: impl Into<String>,
        detail: Option<String>,
        inputs: &[NodeIndex],
    ) -> NodeIndex {
        let node = self.add(GraphNodeKind::Operation {
            op: op.into(),
            detail,
        });
        for (position, input) in inputs.iter().enumerate() {
            self.graph.add_edge(*input, node, position);
        }
        node
    }

    /// Name a node. A later name replaces an earlier one.
    pub fn set_name(&mut self, node: NodeIndex, name: impl Into<String>) {
        if let Some(data) = self.graph.node_weight_mut(node) {
            data.name = Some(name.into());
        }
    }

    pub fn node(&self, node: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(node)
    }

    /// Inputs of `node` in argument order.
    pub fn inputs(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (*edge.weight(), edge.source()))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, source)| source).collect()
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| (idx, n)))
    }

    /// Named nodes in creation order.
    pub fn named_nodes(&self) -> Vec<(&str, NodeIndex)> {
        self.nodes()
            .filter_map(|(idx, node)| node.name.as_deref().map(|name| (name, idx)))
            .collect()
    }

    /// Node with the given binding name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.nodes()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(idx, _)| idx)
    }

    pub fn placeholders(&self) -> Vec<&str> {
        self.nodes()
            .filter_map(|(_, node)| match &node.kind {
                GraphNodeKind::Placeholder { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn set_outputs(&mut self, outputs: Vec<NodeIndex>) {
        self.outputs = outputs;
    }

    pub fn outputs(&self) -> &[NodeIndex] {
        &self.outputs
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The underlying petgraph graph.
    pub fn as_petgraph(&self) -> &DiGraph<GraphNode, usize> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_keep_argument_order() {
        let mut g = Graph::new();
        let a = g.add_placeholder("a");
        let b = g.add_constant("1");
        let sub = g.add_operation("sub", None, &[b, a]);
        assert_eq!(g.inputs(sub), vec![b, a]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn names_and_lookup() {
        let mut g = Graph::new();
        let a = g.add_constant("5");
        g.set_name(a, "a");
        g.set_name(a, "alpha");
        assert_eq!(g.find("alpha"), Some(a));
        assert_eq!(g.named_nodes(), vec![("alpha", a)]);
    }

    #[test]
    fn nodes_serialize_flat() {
        let mut g = Graph::new();
        let x = g.add_placeholder("x");
        let op = g.add_operation("getattr", Some("real".to_string()), &[x]);
        g.set_name(op, "r");
        let json = serde_json::to_value(g.node(op).unwrap()).unwrap();
        assert_eq!(json["kind"], "operation");
        assert_eq!(json["op"], "getattr");
        assert_eq!(json["detail"], "real");
        assert_eq!(json["name"], "r");
        assert_eq!(g.node(op).unwrap().kind.label(), "getattr.real");
    }
}
