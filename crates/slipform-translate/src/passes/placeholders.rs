//! Parameter validation and placeholder injection.

use slipform_cst::{Node, NodeId, ParamKind, Tree, TreeError};
use tracing::debug;

use super::{key_literal, name, namespace_call};
use crate::error::TranslateError;
use crate::options::TranslateOptions;

fn unsupported(name: &str, reason: &str) -> TranslateError {
    TranslateError::UnsupportedParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Check that every parameter of `def` is a plain positional-or-keyword
/// parameter without a default, and return their names in order.
pub fn validate_parameters(
    tree: &Tree,
    def: NodeId,
    options: &TranslateOptions,
) -> Result<Vec<String>, TranslateError> {
    let params = match tree.get(def) {
        Some(Node::FunctionDef { params, .. }) => *params,
        Some(other) => {
            return Err(TranslateError::MalformedTopLevel {
                found: other.kind().to_string(),
                detail: "expected a function definition".to_string(),
            })
        }
        None => return Err(TreeError::UnknownNode(def).into()),
    };
    let Some(Node::Parameters { params }) = tree.get(params) else {
        return Err(TreeError::UnknownNode(params).into());
    };

    let mut names = Vec::with_capacity(params.len());
    for param in params {
        let Some(Node::Param {
            name, kind, default, ..
        }) = tree.get(*param)
        else {
            return Err(TreeError::UnknownNode(*param).into());
        };
        match kind {
            ParamKind::PositionalOnly => {
                return Err(unsupported(name, "positional-only parameters are not supported"))
            }
            ParamKind::VarPositional => {
                return Err(unsupported(name, "variadic positional parameters are not supported"))
            }
            ParamKind::KeywordOnly => {
                return Err(unsupported(name, "keyword-only parameters are not supported"))
            }
            ParamKind::VarKeyword => {
                return Err(unsupported(name, "variadic keyword parameters are not supported"))
            }
            ParamKind::Regular => {}
        }
        if default.is_some() {
            return Err(unsupported(name, "parameter defaults are not supported"));
        }
        if *name == options.namespace {
            return Err(unsupported(name, "parameter shadows the graph namespace"));
        }
        names.push(name.clone());
    }
    Ok(names)
}

/// Bind each parameter to a placeholder at the top of the body, then clear
/// the parameter list.
pub fn inject_placeholders(
    tree: &mut Tree,
    def: NodeId,
    parameters: &[String],
    options: &TranslateOptions,
) -> Result<(), TreeError> {
    let (params, body) = match tree.get(def) {
        Some(Node::FunctionDef { params, body, .. }) => (*params, *body),
        _ => return Err(TreeError::UnknownNode(def)),
    };
    for parameter in parameters.iter().rev() {
        let key = key_literal(tree, parameter);
        let value = namespace_call(tree, &options.namespace, "placeholder", vec![key]);
        let target = name(tree, parameter);
        let stmt = tree.alloc(Node::Assign {
            targets: vec![target],
            value,
        });
        tree.link_parents(stmt);
        tree.insert_at(body, 0, stmt)?;
    }
    for param in tree.children(params) {
        tree.remove_child(params, param)?;
    }
    debug!(count = parameters.len(), "placeholders injected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipform_cst::{parse_linked, render};

    fn definition(source: &str) -> (Tree, NodeId, NodeId) {
        let (tree, root) = parse_linked(source).unwrap();
        let def = tree.statements(root).unwrap()[0];
        (tree, root, def)
    }

    #[test]
    fn placeholders_follow_parameter_order() {
        let options = TranslateOptions::default();
        let (mut tree, root, def) = definition("def f(p1, p2: int, p3):\n    return p1\n");
        let names = validate_parameters(&tree, def, &options).unwrap();
        assert_eq!(names, vec!["p1", "p2", "p3"]);

        inject_placeholders(&mut tree, def, &names, &options).unwrap();
        assert_eq!(
            render(&tree, root),
            "def f():\n    p1 = graph.placeholder('p1')\n    p2 = graph.placeholder('p2')\n    p3 = graph.placeholder('p3')\n    return p1\n"
        );
    }

    #[test]
    fn rejects_unsupported_signatures() {
        let options = TranslateOptions::default();
        let cases = [
            ("def f(a, /, b):\n    pass\n", "a", "positional-only"),
            ("def f(*args):\n    pass\n", "args", "variadic positional"),
            ("def f(a, *, b):\n    pass\n", "b", "keyword-only"),
            ("def f(a=1):\n    pass\n", "a", "defaults"),
            ("def f(**kw):\n    pass\n", "kw", "variadic keyword"),
            ("def f(graph):\n    pass\n", "graph", "namespace"),
        ];
        for (source, expected_name, expected_reason) in cases {
            let (tree, _, def) = definition(source);
            match validate_parameters(&tree, def, &options) {
                Err(TranslateError::UnsupportedParameter { name, reason }) => {
                    assert_eq!(name, expected_name, "{source}");
                    assert!(reason.contains(expected_reason), "{source}: {reason}");
                }
                other => panic!("{source}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn no_parameters_is_fine() {
        let options = TranslateOptions::default();
        let (mut tree, root, def) = definition("def f():\n    return 1\n");
        let names = validate_parameters(&tree, def, &options).unwrap();
        assert!(names.is_empty());
        inject_placeholders(&mut tree, def, &names, &options).unwrap();
        assert_eq!(render(&tree, root), "def f():\n    return 1\n");
    }
}
