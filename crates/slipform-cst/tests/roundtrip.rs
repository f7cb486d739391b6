// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the slipform-cst parser and code generator.
//!
//! Canonical source (four-space indentation, single spaces around binary
//! operators, no redundant parentheses) must render back unchanged.

use std::path::PathBuf;

use difference::assert_diff;
use itertools::Itertools;
use slipform_cst::{parse_module, prettify_error, render};

/// Helper to visualize whitespace differences in test output
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn assert_roundtrip(input: &str, label: &str) {
    let tree = match parse_module(input) {
        Ok(tree) => tree,
        Err(e) => panic!("{}", prettify_error(&e, input, label)),
    };
    let root = tree.root().expect("module root");
    let generated = render(&tree, root);

    if generated != input {
        let got = visualize(&generated);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

fn assert_renders_as(input: &str, expected: &str) {
    let tree = parse_module(input).expect("parse");
    let root = tree.root().expect("module root");
    assert_eq!(render(&tree, root), expected);
}

#[test]
fn roundtrip_fixture_dataflow() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("dataflow.py");
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture: {}", e));
    assert_roundtrip(&contents, "dataflow.py");
}

#[test]
fn roundtrip_function() {
    assert_roundtrip("def f(a, b):\n    c = a + b\n    return c\n", "function");
}

#[test]
fn roundtrip_async_def_and_for() {
    assert_roundtrip(
        "async def f(a, /, b, *args, c=1, **kw):\n    async for x in a:\n        continue\n    else:\n        raise ValueError(b) from None\n",
        "async",
    );
}

#[test]
fn roundtrip_annotated_defaults() {
    assert_roundtrip("def f(a: int = 1, *, b: str = 'x'):\n    pass\n", "defaults");
}

#[test]
fn roundtrip_precedence() {
    assert_roundtrip("x = (a + b) * c\n", "mul");
    assert_roundtrip("x = a - (b - c)\n", "sub");
    assert_roundtrip("x = (-a) ** 2\n", "neg-pow");
    assert_roundtrip("x = -a ** 2\n", "pow-neg");
    assert_roundtrip("x = a ** b ** c\n", "pow-right");
    assert_roundtrip("x = (a ** b) ** c\n", "pow-left");
    assert_roundtrip("x = not (a == b) < c\n", "compare-nest");
    assert_roundtrip("x = (a or b) and c\n", "boolops");
    assert_roundtrip("x = (a if b else c).d\n", "ifexp-attr");
    assert_roundtrip("x = a[1:2, ::3]\n", "slices");
    assert_roundtrip("x = f(*a, **b, c=d)\n", "call-args");
}

#[test]
fn roundtrip_tuples() {
    assert_roundtrip("a, b = b, a\n", "swap");
    assert_roundtrip("x = ()\n", "empty");
    assert_roundtrip("x = (1,)\n", "single");
    assert_roundtrip("x = 1,\n", "bare-single");
    assert_roundtrip("f((a, b))\n", "argument");
    assert_roundtrip("for (a, b) in c:\n    pass\n", "target");
}

#[test]
fn roundtrip_comments() {
    assert_roundtrip(
        "# leading\ndef f():\n    # [ignore]\n    a = 1  # trailing\n    if a:  # header\n        pass\n    # closing\n# after\n",
        "comments",
    );
}

#[test]
fn roundtrip_strings() {
    assert_roundtrip("x = 'a' \"b\"\ny = b'\\x00'\nz = f'{x!r}'\nw = '''a\nb'''\n", "strings");
}

#[test]
fn canonicalizes_layout() {
    assert_renders_as("x = ( a+b )\n", "x = a + b\n");
    assert_renders_as("if x: y = 1; z = 2\n", "if x:\n    y = 1\n    z = 2\n");
    assert_renders_as("def f(\n    a,\n    b,\n):\n  return a\n", "def f(a, b):\n    return a\n");
    assert_renders_as("x = [\n  1,  # one\n  2,\n]\n", "x = [1, 2]\n");
}

#[test]
fn canonicalizes_elif_chain() {
    assert_roundtrip(
        "if a:\n    pass\nelif b:\n    pass\nelif c:\n    pass\nelse:\n    pass\n",
        "elif",
    );
}
