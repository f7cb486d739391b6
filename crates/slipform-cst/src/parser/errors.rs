// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use annotate_snippets::{Level, Renderer, Snippet};
use slipform_core::span::Span;
use slipform_core::text::{byte_offset_to_position_str, line_start_offset_str};
use thiserror::Error;

use crate::tokenizer::TokError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("{what} is not supported")]
    Unsupported { what: String, span: Span },

    #[error("cannot assign to {what}")]
    InvalidTarget { what: String, span: Span },
}

impl ParserError {
    /// Source range the error points at.
    pub fn span(&self) -> Span {
        match self {
            ParserError::TokenizerError(err) => Span::new(err.offset(), err.offset()),
            ParserError::UnexpectedToken { span, .. }
            | ParserError::Unsupported { span, .. }
            | ParserError::InvalidTarget { span, .. } => *span,
        }
    }

    /// 1-indexed line and column of the error start.
    pub fn position(&self, source: &str) -> (u32, u32) {
        byte_offset_to_position_str(source, self.span().start)
    }
}

/// Render a parser error as an annotated snippet of the offending line.
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    let span = err.span();
    let (line, _) = err.position(source);
    let line_start = line_start_offset_str(source, line);
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());
    let text = &source[line_start..line_end];

    let start = floor_char_boundary(text, span.start.clamp(line_start, line_end) - line_start);
    let mut end = span.end.clamp(line_start, line_end) - line_start;
    if end <= start {
        end = start + text[start..].chars().next().map_or(0, char::len_utf8);
    }
    let end = floor_char_boundary(text, end).max(start);
    let message = err.to_string();
    let title = format!("{label}: {message}");
    let report = Level::Error.title(&title).snippet(
        Snippet::source(text)
            .line_start(line as usize)
            .fold(false)
            .annotations(vec![Level::Error.span(start..end).label(&message)]),
    );
    let renderer = Renderer::plain();
    let rendered = renderer.render(report);
    rendered.to_string()
}

/// Largest char boundary in `text` at or before `offset`.
fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_of_tokenizer_error() {
        let err = ParserError::from(TokError::UnterminatedString { offset: 7 });
        assert_eq!(err.span(), Span::new(7, 7));
    }

    #[test]
    fn prettify_points_at_line() {
        let source = "def f():\n    x = $\n";
        let err = ParserError::from(TokError::UnexpectedCharacter {
            ch: '$',
            offset: 17,
        });
        let rendered = prettify_error(&err, source, "syntax error");
        assert!(rendered.contains("syntax error"));
        assert!(rendered.contains("x = $"));
        assert!(rendered.contains('2'));
        assert_eq!(err.position(source), (2, 9));
    }

    #[test]
    fn prettify_handles_multibyte_offender() {
        let source = "def f():\n    x = 1 \u{a7} 2\n";
        let err = crate::parse_module(source).unwrap_err();
        let rendered = prettify_error(&err, source, "input");
        assert!(rendered.contains("input"));
        assert!(rendered.contains("x = 1 \u{a7} 2"));
    }

    #[test]
    fn prettify_rounds_inner_offsets_down() {
        let source = "x = '\u{e9}\u{e9}\n";
        // Offset 6 sits inside the first two-byte character.
        let err = ParserError::from(TokError::UnterminatedString { offset: 6 });
        let rendered = prettify_error(&err, source, "input");
        assert!(rendered.contains("x = '"));
        assert_eq!(floor_char_boundary("'\u{e9}", 2), 1);
    }
}
