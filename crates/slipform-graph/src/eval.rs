//! Evaluation of a translated body inside a fresh graph-building context.
//!
//! Values are graph nodes, the namespace itself, unbound names (callable
//! only), untranslated literals, and tuples of values. Literals and tuples
//! become graph nodes when an operation consumes them.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use slipform_cst::{Node, NodeId, NodeKind, Tree};
use tracing::trace;

use crate::error::EvalError;
use crate::graph::Graph;

#[derive(Debug, Clone)]
enum Value {
    Node(NodeIndex),
    Namespace,
    Function(String),
    Literal(String),
    Tuple(Vec<Value>),
}

enum Flow {
    Next,
    Return,
}

/// Strip the quotes from a plain string literal.
fn unquote(raw: &str) -> Option<&str> {
    ["\"\"\"", "'''", "\"", "'"].into_iter().find_map(|quote| {
        let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
        Some(inner)
    })
}

fn unsupported(what: impl Into<String>) -> EvalError {
    EvalError::Unsupported { what: what.into() }
}

pub(crate) struct Evaluator<'p> {
    tree: &'p Tree,
    namespace: &'p str,
    announce_method: &'p str,
    graph: Graph,
    env: HashMap<String, Value>,
}

impl<'p> Evaluator<'p> {
    pub(crate) fn new(tree: &'p Tree, namespace: &'p str, announce_method: &'p str) -> Self {
        Self {
            tree,
            namespace,
            announce_method,
            graph: Graph::new(),
            env: HashMap::new(),
        }
    }

    pub(crate) fn run(mut self, body: NodeId) -> Result<Graph, EvalError> {
        let tree = self.tree;
        let statements = tree.statements(body).unwrap_or_default();
        for stmt in statements {
            if let Flow::Return = self.statement(*stmt)? {
                break;
            }
        }
        Ok(self.graph)
    }

    fn node(&self, id: NodeId) -> Result<&'p Node, EvalError> {
        self.tree
            .get(id)
            .ok_or_else(|| unsupported(format!("dangling node {id}")))
    }

    fn statement(&mut self, id: NodeId) -> Result<Flow, EvalError> {
        match self.node(id)? {
            Node::Assign { targets, value } => {
                let value = self.expr(*value)?;
                for target in targets {
                    self.bind(*target, value.clone())?;
                }
            }
            Node::AugAssign { target, op, value } => {
                let Node::Name { id: name } = self.node(*target)? else {
                    return Err(unsupported("augmented assignment to a compound target"));
                };
                let current = self.lookup(name)?;
                let current = self.lift(current)?;
                let rhs = self.expr(*value)?;
                let rhs = self.lift(rhs)?;
                let node = self.graph.add_operation(op.op_name(), None, &[current, rhs]);
                self.env.insert(name.clone(), Value::Node(node));
            }
            Node::AnnAssign {
                target,
                value: Some(value),
                ..
            } => {
                let value = self.expr(*value)?;
                self.bind(*target, value)?;
            }
            Node::AnnAssign { value: None, .. } | Node::Pass | Node::Comment { .. } => {}
            Node::ExprStmt { value } => {
                self.expr(*value)?;
            }
            Node::Return { value } => {
                let outputs = match value {
                    None => Vec::new(),
                    Some(value) => match self.expr(*value)? {
                        Value::Tuple(items) => items
                            .into_iter()
                            .map(|item| self.lift(item))
                            .collect::<Result<Vec<_>, _>>()?,
                        other => vec![self.lift(other)?],
                    },
                };
                self.graph.set_outputs(outputs);
                return Ok(Flow::Return);
            }
            other => return Err(unsupported(format!("{} statement", other.kind()))),
        }
        Ok(Flow::Next)
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if name == self.namespace {
            return Ok(Value::Namespace);
        }
        Ok(self
            .env
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Function(name.to_string())))
    }

    fn bind(&mut self, target: NodeId, value: Value) -> Result<(), EvalError> {
        match self.node(target)? {
            Node::Name { id } => {
                self.env.insert(id.clone(), value);
                Ok(())
            }
            Node::Tuple { elts, .. } | Node::List { elts } => match value {
                Value::Tuple(items) if items.len() == elts.len() => {
                    for (elt, item) in elts.iter().zip(items) {
                        self.bind(*elt, item)?;
                    }
                    Ok(())
                }
                Value::Tuple(items) => Err(EvalError::Destructure {
                    expected: elts.len(),
                    found: items.len(),
                }),
                _ => Err(unsupported("unpacking a graph value")),
            },
            other => Err(unsupported(format!("assignment to {}", other.kind()))),
        }
    }

    /// Turn a value into a graph node, adding nodes for literals and tuples.
    fn lift(&mut self, value: Value) -> Result<NodeIndex, EvalError> {
        match value {
            Value::Node(node) => Ok(node),
            Value::Literal(raw) => Ok(self.graph.add_constant(raw)),
            Value::Tuple(items) => {
                let inputs = items
                    .into_iter()
                    .map(|item| self.lift(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.graph.add_operation("tuple", None, &inputs))
            }
            Value::Namespace => Err(EvalError::NotAValue {
                what: self.namespace.to_string(),
            }),
            Value::Function(name) => Err(EvalError::UnboundName { name }),
        }
    }

    fn lift_expr(&mut self, id: NodeId) -> Result<NodeIndex, EvalError> {
        let value = self.expr(id)?;
        self.lift(value)
    }

    fn expr(&mut self, id: NodeId) -> Result<Value, EvalError> {
        let value = match self.node(id)? {
            Node::Name { id: name } => self.lookup(name)?,
            Node::Constant { raw, .. } => Value::Literal(raw.clone()),
            Node::Tuple { elts, .. } => Value::Tuple(
                elts.iter()
                    .map(|elt| self.expr(*elt))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Node::List { elts } => {
                let inputs = self.lift_all(elts)?;
                Value::Node(self.graph.add_operation("list", None, &inputs))
            }
            Node::Call { func, args } => self.call(*func, args)?,
            Node::Attribute { value, attr } => {
                let receiver = self.expr(*value)?;
                if let Value::Namespace = receiver {
                    return Err(unsupported(format!(
                        "{}.{attr} outside a call",
                        self.namespace
                    )));
                }
                let input = self.lift(receiver)?;
                Value::Node(self.graph.add_operation("getattr", Some(attr.clone()), &[input]))
            }
            Node::Subscript { value, slice } => {
                let value = self.lift_expr(*value)?;
                let index = self.lift_expr(*slice)?;
                Value::Node(self.graph.add_operation("getitem", None, &[value, index]))
            }
            Node::Slice { lower, upper, step } => {
                let mut inputs = Vec::with_capacity(3);
                for part in [lower, upper, step] {
                    let input = match part {
                        Some(part) => self.lift_expr(*part)?,
                        None => self.graph.add_constant("None"),
                    };
                    inputs.push(input);
                }
                Value::Node(self.graph.add_operation("slice", None, &inputs))
            }
            Node::BinOp { left, op, right } => {
                let left = self.lift_expr(*left)?;
                let right = self.lift_expr(*right)?;
                Value::Node(self.graph.add_operation(op.op_name(), None, &[left, right]))
            }
            Node::UnaryOp { op, operand } => {
                let operand = self.lift_expr(*operand)?;
                Value::Node(self.graph.add_operation(op.op_name(), None, &[operand]))
            }
            Node::Compare {
                left,
                ops,
                comparators,
            } => {
                let mut previous = self.lift_expr(*left)?;
                let mut tests = Vec::with_capacity(ops.len());
                for (op, comparator) in ops.iter().zip(comparators) {
                    let current = self.lift_expr(*comparator)?;
                    tests.push(self.graph.add_operation(op.op_name(), None, &[previous, current]));
                    previous = current;
                }
                match tests.as_slice() {
                    [single] => Value::Node(*single),
                    _ => Value::Node(self.graph.add_operation("and_", None, &tests)),
                }
            }
            other => return Err(unsupported(format!("{} expression", other.kind()))),
        };
        Ok(value)
    }

    fn lift_all(&mut self, ids: &[NodeId]) -> Result<Vec<NodeIndex>, EvalError> {
        ids.iter().map(|id| self.lift_expr(*id)).collect()
    }

    fn call(&mut self, func: NodeId, args: &[NodeId]) -> Result<Value, EvalError> {
        for arg in args {
            let kind = self.node(*arg)?.kind();
            if matches!(
                kind,
                NodeKind::Keyword | NodeKind::Starred | NodeKind::DoubleStarred
            ) {
                return Err(unsupported(format!("{kind} argument")));
            }
        }

        if let Node::Attribute { value, attr } = self.node(func)? {
            let receiver = self.expr(*value)?;
            if let Value::Namespace = receiver {
                return self.namespace_call(attr, args);
            }
            if attr == self.announce_method {
                return self.announce(receiver, attr, args);
            }
            let mut inputs = vec![self.lift(receiver)?];
            inputs.extend(self.lift_all(args)?);
            let node = self
                .graph
                .add_operation("call_method", Some(attr.clone()), &inputs);
            return Ok(Value::Node(node));
        }

        let (detail, mut inputs) = match self.expr(func)? {
            Value::Function(name) => (Some(name), Vec::new()),
            other => (None, vec![self.lift(other)?]),
        };
        inputs.extend(self.lift_all(args)?);
        Ok(Value::Node(self.graph.add_operation("call", detail, &inputs)))
    }

    fn literal_argument(&self, method: &str, args: &[NodeId]) -> Result<&'p str, EvalError> {
        let [arg] = args else {
            return Err(EvalError::Arity {
                method: method.to_string(),
                expected: 1,
                found: args.len(),
            });
        };
        match self.node(*arg)? {
            Node::Constant { raw, .. } => Ok(raw),
            _ => Err(EvalError::ExpectedLiteral {
                method: method.to_string(),
            }),
        }
    }

    fn namespace_call(&mut self, method: &str, args: &[NodeId]) -> Result<Value, EvalError> {
        let node = match method {
            "constant" => {
                let raw = self.literal_argument(method, args)?;
                self.graph.add_constant(raw)
            }
            "placeholder" => {
                let raw = self.literal_argument(method, args)?;
                let name = unquote(raw).ok_or_else(|| EvalError::ExpectedLiteral {
                    method: method.to_string(),
                })?;
                self.graph.add_placeholder(name)
            }
            _ => {
                let inputs = self.lift_all(args)?;
                self.graph.add_operation(method, None, &inputs)
            }
        };
        trace!(method, node = node.index(), "namespace call");
        Ok(Value::Node(node))
    }

    fn announce(&mut self, receiver: Value, method: &str, args: &[NodeId]) -> Result<Value, EvalError> {
        let raw = self.literal_argument(method, args)?;
        let key = unquote(raw).ok_or_else(|| EvalError::ExpectedLiteral {
            method: method.to_string(),
        })?;
        let node = self.lift(receiver)?;
        self.graph.set_name(node, key);
        Ok(Value::Node(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_plain_strings() {
        assert_eq!(unquote("'a'"), Some("a"));
        assert_eq!(unquote("\"b\""), Some("b"));
        assert_eq!(unquote("'''c'''"), Some("c"));
        assert_eq!(unquote("5"), None);
    }
}
