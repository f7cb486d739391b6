// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use super::*;

fn kinds(source: &str) -> Vec<TokType> {
    tokenize(source)
        .expect("tokenize")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(source: &str) -> Vec<&str> {
    tokenize(source)
        .expect("tokenize")
        .into_iter()
        .filter(|t| !matches!(t.kind, TokType::Newline | TokType::Indent | TokType::Dedent | TokType::EndMarker))
        .map(|t| t.text)
        .collect()
}

use TokType::*;

#[test]
fn simple_assignment() {
    assert_eq!(kinds("a = 1\n"), vec![Name, Op, Number, Newline, EndMarker]);
    assert_eq!(texts("a = 1\n"), vec!["a", "=", "1"]);
}

#[test]
fn missing_final_newline_is_synthesized() {
    assert_eq!(kinds("x"), vec![Name, Newline, EndMarker]);
}

#[test]
fn indent_and_dedent() {
    let src = "def f():\n    a = 1\nb = 2\n";
    assert_eq!(
        kinds(src),
        vec![
            Name, Name, Op, Op, Op, Newline, Indent, Name, Op, Number, Newline, Dedent, Name, Op,
            Number, Newline, EndMarker
        ]
    );
}

#[test]
fn dedents_are_closed_at_end_of_input() {
    let src = "def f():\n    if x:\n        y\n";
    let toks = kinds(src);
    let dedents = toks.iter().filter(|k| **k == Dedent).count();
    assert_eq!(dedents, 2);
    assert_eq!(toks.last(), Some(&EndMarker));
}

#[test]
fn inconsistent_dedent_is_an_error() {
    let err = tokenize("def f():\n    a\n  b\n").unwrap_err();
    assert!(matches!(err, TokError::InconsistentDedent { .. }));
}

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(kinds("a\n\n   \nb\n"), vec![Name, Newline, Name, Newline, EndMarker]);
}

#[test]
fn newlines_inside_brackets_are_joined() {
    let src = "f(a,\n  b)\n";
    assert_eq!(texts(src), vec!["f", "(", "a", ",", "b", ")"]);
    assert_eq!(kinds(src).iter().filter(|k| **k == Newline).count(), 1);
}

#[test]
fn comments_inside_brackets_are_dropped() {
    assert_eq!(texts("f(a,  # first\n  b)\n"), vec!["f", "(", "a", ",", "b", ")"]);
}

#[test]
fn trailing_comment_precedes_newline() {
    assert_eq!(
        kinds("a = 1  # note\n"),
        vec![Name, Op, Number, Comment, Newline, EndMarker]
    );
}

#[test]
fn comment_line_aligned_with_block() {
    let src = "def f():\n    # [ignore]\n    a = 1\n";
    assert_eq!(
        kinds(src),
        vec![
            Name, Name, Op, Op, Op, Newline, Indent, Comment, Newline, Name, Op, Number, Newline,
            Dedent, EndMarker
        ]
    );
}

#[test]
fn comment_before_dedent_joins_outer_block() {
    let src = "def f():\n    a\n# top\nb\n";
    let toks = kinds(src);
    let dedent = toks.iter().position(|k| *k == Dedent).unwrap();
    let comment = toks.iter().position(|k| *k == Comment).unwrap();
    assert!(dedent < comment);
}

#[test]
fn deeper_comment_stays_in_current_block() {
    let src = "def f():\n    a\n        # deep\n    b\n";
    let toks = kinds(src);
    assert_eq!(toks.iter().filter(|k| **k == Indent).count(), 1);
}

#[test]
fn comment_at_enclosing_level_dedents_first() {
    let src = "def f():\n    if x:\n        a\n    # mid\nb\n";
    let toks = tokenize(src).unwrap();
    let comment = toks.iter().position(|t| t.kind == Comment).unwrap();
    let dedents_before = toks[..comment].iter().filter(|t| t.kind == Dedent).count();
    assert_eq!(dedents_before, 1);
}

#[test]
fn strings_with_prefixes_and_escapes() {
    assert_eq!(
        texts(r#"s = b'x\'y' + "a" + r"\d""#),
        vec!["s", "=", r"b'x\'y'", "+", "\"a\"", "+", r#"r"\d""#]
    );
    let toks = tokenize("f'{x}'\n").unwrap();
    assert_eq!(toks[0].kind, FString);
    assert_eq!(toks[0].text, "f'{x}'");
}

#[test]
fn triple_quoted_strings_span_lines() {
    let toks = tokenize("'''a\nb'''\n").unwrap();
    assert_eq!(toks[0].kind, String);
    assert_eq!(toks[0].text, "'''a\nb'''");
}

#[test]
fn unterminated_string_is_an_error() {
    let err = tokenize("a = 'abc\n").unwrap_err();
    assert_eq!(err, TokError::UnterminatedString { offset: 4 });
}

#[test]
fn numbers() {
    assert_eq!(
        texts("0x1F 1_000 3.14 .5 1e-3 2j 0b101 7."),
        vec!["0x1F", "1_000", "3.14", ".5", "1e-3", "2j", "0b101", "7."]
    );
}

#[test]
fn longest_operator_wins() {
    assert_eq!(texts("a **= b // c -> d ..."), vec!["a", "**=", "b", "//", "c", "->", "d", "..."]);
}

#[test]
fn unmatched_brackets() {
    assert!(matches!(
        tokenize("f(a]\n").unwrap_err(),
        TokError::UnmatchedBracket { ch: ']', .. }
    ));
    assert!(matches!(
        tokenize("f(a\n").unwrap_err(),
        TokError::UnmatchedBracket { ch: '(', offset: 1 }
    ));
}

#[test]
fn unexpected_character() {
    assert_eq!(
        tokenize("a ? b").unwrap_err(),
        TokError::UnexpectedCharacter { ch: '?', offset: 2 }
    );
}

#[test]
fn line_continuation() {
    assert_eq!(kinds("a = \\\n  1\n"), vec![Name, Op, Number, Newline, EndMarker]);
}

#[test]
fn offsets_point_into_source() {
    let src = "ab = cd\n";
    for tok in tokenize(src).unwrap() {
        assert_eq!(&src[tok.start..tok.end], tok.text);
    }
}
