//! End-to-end behavior of the translation pipeline.

use slipform_cst::visitor::Severity;
use slipform_cst::{parse_linked, render, Node, Tree};
use slipform_translate::passes::WrapConstants;
use slipform_translate::{translate, ScopeOrigin, TranslateError, TranslateOptions};

fn options() -> TranslateOptions {
    TranslateOptions::default()
}

/// Body statements of the translated definition, rendered one by one.
fn body_lines(source: &str) -> Vec<String> {
    let out = translate(source, &options()).unwrap();
    let Some(Node::FunctionDef { body, .. }) = out.tree.get(out.definition) else {
        panic!("expected a definition");
    };
    out.tree
        .statements(*body)
        .unwrap()
        .iter()
        .map(|stmt| render(&out.tree, *stmt).trim_end().to_string())
        .collect()
}

#[test]
fn constant_wrapping_is_idempotent_on_its_own_output() {
    let source = "def f(x):\n    y = x * 2 + 0.5\n    z = [1, 'two', None]\n    return y, z\n";
    let first = translate(source, &options()).unwrap();

    let (mut tree, root) = parse_linked(&first.source).unwrap();
    let opts = options();
    let mut pass = WrapConstants::new(&opts);
    slipform_cst::visitor::Dispatcher::new().transform(&mut pass, &mut tree, root);
    assert_eq!(pass.wrapped(), 0);
    assert_eq!(render(&tree, root), first.source);
}

#[test]
fn announcements_follow_destructuring_order() {
    let lines = body_lines("def f(v):\n    n1, (n2, _skip), [n3, *n4], obj.x = v\n    return n1\n");
    assert_eq!(
        lines,
        vec![
            "v = graph.placeholder('v')",
            "n1, (n2, _skip), [n3, *n4], obj.x = v",
            "n1.set_name('n1')",
            "n2.set_name('n2')",
            "n3.set_name('n3')",
            "n4.set_name('n4')",
            "return n1",
        ]
    );
}

#[test]
fn placeholders_follow_parameter_order() {
    let out = translate("def f(p1, p2, p3):\n    return p1\n", &options()).unwrap();
    assert_eq!(out.parameters, vec!["p1", "p2", "p3"]);
    assert!(out.source.starts_with(
        "def f():\n    p1 = graph.placeholder('p1')\n    p2 = graph.placeholder('p2')\n    p3 = graph.placeholder('p3')\n"
    ));
}

#[test]
fn ignored_statement_is_untouched() {
    let source = "def f(x):\n    # [ignore]\n    if x:\n        y = 1\n        z = y in x\n    w = 2\n    return w\n";
    let before = {
        let (tree, root) = parse_linked(source).unwrap();
        (tree, root)
    };
    let out = translate(source, &options()).unwrap();

    let find_if = |tree: &Tree| {
        slipform_cst::visitor::walk(tree, tree.root().unwrap())
            .find(|id| matches!(tree.get(*id), Some(Node::If { .. })))
            .unwrap()
    };
    let original_if = find_if(&before.0);
    let translated_if = find_if(&out.tree);
    assert!(before.0.structurally_equal(original_if, &out.tree, translated_if));

    assert!(out.source.contains("    w = graph.constant(2)\n    w.set_name('w')\n"));
    let ignored: usize = out.reports.iter().map(|r| r.ignored).sum();
    assert_eq!(ignored, 4);
}

#[test]
fn membership_rewrite_is_selective() {
    let out = translate(
        "def f(x, y):\n    a = x in y\n    b = x < y < 3\n    return a, b\n",
        &options(),
    )
    .unwrap();
    assert!(out.source.contains("a = graph.contains(y, x)\n"));
    assert!(out.source.contains("b = x < y < graph.constant(3)\n"));

    let diagnostics: Vec<_> = out.diagnostics().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].pass, "rewrite-membership");
}

#[test]
fn compound_targets_get_no_announcement() {
    let lines = body_lines("def f(obj, seq):\n    obj.attr = 1\n    seq[0] = 1\n    return obj\n");
    assert!(lines.iter().all(|line| !line.contains("set_name")));
    assert_eq!(lines[2], "obj.attr = graph.constant(1)");
    assert_eq!(lines[3], "seq[graph.constant(0)] = graph.constant(1)");
}

#[test]
fn variadic_parameter_fails_before_rewriting() {
    let err = translate("def f(x, *args):\n    y = 1\n    return y\n", &options()).unwrap_err();
    match err {
        TranslateError::UnsupportedParameter { name, .. } => assert_eq!(name, "args"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn end_to_end_two_bindings() {
    let lines = body_lines("def f():\n    a = 5\n    b = a + 1\n    return b\n");
    assert_eq!(
        lines,
        vec![
            "a = graph.constant(5)",
            "a.set_name('a')",
            "b = a + graph.constant(1)",
            "b.set_name('b')",
            "return b",
        ]
    );
}

#[test]
fn trailing_directive_is_reported() {
    let out = translate("def f():\n    x = 1\n    # [ignore]\n", &options()).unwrap();
    assert!(out
        .diagnostics()
        .any(|d| d.message.contains("no following statement")));
    assert!(out.source.contains("x = graph.constant(1)\n    x.set_name('x')\n"));
}

#[test]
fn comments_and_docstrings_survive() {
    let source = "def f(x):\n    \"\"\"Doc.\"\"\"\n    # scale it\n    y = x * 3  # triple\n    return y\n";
    let out = translate(source, &options()).unwrap();
    assert_eq!(
        out.source,
        "def f():\n    x = graph.placeholder('x')\n    graph.constant(\"\"\"Doc.\"\"\")\n    # scale it\n    y = x * graph.constant(3)  # triple\n    y.set_name('y')\n    return y\n"
    );
    assert_eq!(out.scope.origin("x"), Some(ScopeOrigin::Parameter));
}
