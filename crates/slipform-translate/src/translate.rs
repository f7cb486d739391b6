//! The translation pipeline.
//!
//! Passes run in a fixed order over a private, freshly parsed tree:
//!
//! 1. decorators are stripped from the definition
//! 2. literals are wrapped as constants
//! 3. bindings are announced and recorded in the [`Scope`]
//! 4. membership tests become `contains` calls
//! 5. parameters become placeholder bindings
//!
//! Constants run before bindings so announce keys stay plain strings, and
//! placeholders run last so their bindings are not announced.

use slipform_cst::visitor::{walk, Diagnostic, Dispatcher, TransformReport};
use slipform_cst::{parse_linked, render, Node, NodeId, NodeKind, Tree};
use tracing::{debug, info};

use crate::error::TranslateError;
use crate::options::TranslateOptions;
use crate::passes::{
    inject_placeholders, validate_parameters, RegisterBindings, RewriteMembership,
    StripDecorators, WrapConstants,
};
use crate::scope::{Scope, ScopeOrigin};

/// Log target for rendered translations when debugging is enabled.
pub const DEBUG_TARGET: &str = "slipform::debug";

/// A rewritten definition.
#[derive(Debug, Clone)]
pub struct Translation {
    pub tree: Tree,
    pub root: NodeId,
    pub definition: NodeId,
    /// Name of the definition as written.
    pub name: String,
    /// Declared parameters, now placeholder bindings.
    pub parameters: Vec<String>,
    pub scope: Scope,
    /// One report per dispatcher pass, in run order.
    pub reports: Vec<TransformReport>,
    /// Rendered translated module.
    pub source: String,
}

impl Translation {
    /// Soft failures from every pass.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reports.iter().flat_map(|r| r.diagnostics.iter())
    }

    pub fn has_diagnostics(&self) -> bool {
        self.reports.iter().any(TransformReport::has_diagnostics)
    }
}

/// Find the single top-level definition; comments may surround it.
fn find_definition(tree: &Tree, root: NodeId) -> Result<NodeId, TranslateError> {
    let statements = tree.statements(root).unwrap_or_default();
    let mut definitions = Vec::new();
    for stmt in statements {
        match tree.kind(*stmt) {
            Some(NodeKind::FunctionDef) => definitions.push(*stmt),
            Some(NodeKind::Comment) => {}
            Some(other) => {
                return Err(TranslateError::MalformedTopLevel {
                    found: other.to_string(),
                    detail: "only one definition and comments may appear at top level"
                        .to_string(),
                })
            }
            None => {}
        }
    }
    match definitions.as_slice() {
        [def] => Ok(*def),
        [] => Err(TranslateError::MalformedTopLevel {
            found: "no definition".to_string(),
            detail: "expected exactly one top-level definition".to_string(),
        }),
        many => Err(TranslateError::MalformedTopLevel {
            found: format!("{} definitions", many.len()),
            detail: "expected exactly one top-level definition".to_string(),
        }),
    }
}

/// Names read in the definition that nothing binds.
fn collect_externals(tree: &Tree, def: NodeId, options: &TranslateOptions, scope: &mut Scope) {
    for id in walk(tree, def) {
        if let Some(Node::Name { id: name }) = tree.get(id) {
            if *name != options.namespace {
                scope.insert(name, ScopeOrigin::External);
            }
        }
    }
}

/// Translate the source of one definition into graph-building code.
pub fn translate(source: &str, options: &TranslateOptions) -> Result<Translation, TranslateError> {
    let (mut tree, root) = parse_linked(source)?;
    let def = find_definition(&tree, root)?;
    let name = match tree.get(def) {
        Some(Node::FunctionDef { name, .. }) => name.clone(),
        _ => String::new(),
    };
    debug!(definition = %name, nodes = tree.len(), "translating");

    let parameters = validate_parameters(&tree, def, options)?;
    let mut scope = Scope::new();
    for parameter in &parameters {
        scope.insert(parameter, ScopeOrigin::Parameter);
    }

    let mut dispatcher = Dispatcher::new();
    let mut reports = Vec::with_capacity(4);

    let mut strip = StripDecorators::new(def);
    reports.push(dispatcher.transform(&mut strip, &mut tree, def));

    let mut constants = WrapConstants::new(options);
    reports.push(dispatcher.transform(&mut constants, &mut tree, def));

    let mut bindings = RegisterBindings::new(options, scope);
    reports.push(dispatcher.transform(&mut bindings, &mut tree, def));
    let mut scope = bindings.into_scope();

    let mut membership = RewriteMembership::new(options);
    reports.push(dispatcher.transform(&mut membership, &mut tree, def));

    inject_placeholders(&mut tree, def, &parameters, options)?;
    collect_externals(&tree, def, options, &mut scope);

    let rendered = render(&tree, root);
    if options.debug {
        info!(target: DEBUG_TARGET, definition = %name, "translated source:\n{rendered}");
    }
    let diagnostics: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    debug!(definition = %name, diagnostics, "translation complete");

    Ok(Translation {
        tree,
        root,
        definition: def,
        name,
        parameters,
        scope,
        reports,
        source: rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_rendering() {
        let source = "def f():\n    a = 5\n    b = a + 1\n    return b\n";
        let out = translate(source, &TranslateOptions::default()).unwrap();
        assert_eq!(
            out.source,
            "def f():\n    a = graph.constant(5)\n    a.set_name('a')\n    b = a + graph.constant(1)\n    b.set_name('b')\n    return b\n"
        );
        assert!(!out.has_diagnostics());
        assert_eq!(out.reports.len(), 4);
    }

    #[test]
    fn top_level_shape_is_enforced() {
        let options = TranslateOptions::default();
        for source in [
            "x = 1\n",
            "# only a comment\n",
            "def f():\n    pass\ndef g():\n    pass\n",
            "def f():\n    pass\nx = 1\n",
        ] {
            assert!(
                matches!(
                    translate(source, &options),
                    Err(TranslateError::MalformedTopLevel { .. })
                ),
                "{source}"
            );
        }
        assert!(translate("# header\ndef f():\n    pass\n", &options).is_ok());
    }

    #[test]
    fn scope_records_every_origin() {
        let source = "def f(x):\n    y = scale(x)\n    _t = y\n    return y\n";
        let out = translate(source, &TranslateOptions::default()).unwrap();
        assert_eq!(out.scope.names(ScopeOrigin::Parameter), vec!["x"]);
        assert_eq!(out.scope.names(ScopeOrigin::LocalBinding), vec!["y", "_t"]);
        assert_eq!(out.scope.names(ScopeOrigin::External), vec!["scale"]);
    }

    #[test]
    fn syntax_errors_are_hard_failures() {
        let err = translate("def f(:\n", &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, TranslateError::Parse(_)));
    }

    #[test]
    fn custom_namespace_and_announce() {
        let options = TranslateOptions::new()
            .with_namespace("pf")
            .with_announce_method("named");
        let out = translate("def f(v):\n    w = v in (1,)\n    return w\n", &options).unwrap();
        assert_eq!(
            out.source,
            "def f():\n    v = pf.placeholder('v')\n    w = pf.contains((pf.constant(1),), v)\n    w.named('w')\n    return w\n"
        );
    }
}
