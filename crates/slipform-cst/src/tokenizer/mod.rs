// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Line-oriented tokenizer for the host grammar.
//!
//! Produces a flat token stream with synthetic `Newline`, `Indent` and
//! `Dedent` tokens. Newlines inside brackets are implicit joins and never
//! reach the parser.
//!
//! Comments are kept as tokens so the parser can turn them into statements.
//! A comment that occupies its own line is followed by a `Newline` and is
//! placed in the indentation context of the block it visually belongs to:
//!
//! - aligned with the next code line: indentation is processed as if it were
//!   code (so a comment before a dedent belongs to the outer block)
//! - aligned with an enclosing block that the next code line also returns to:
//!   dedent to that block first
//! - otherwise it stays in the current block
//!
//! A comment after code on the same line is emitted before that line's
//! `Newline`. Comments inside brackets are dropped.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokType {
    Name,
    Number,
    String,
    /// An f-string; its text includes prefix and quotes.
    FString,
    Op,
    Comment,
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

impl fmt::Display for TokType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokType::Name => "name",
            TokType::Number => "number",
            TokType::String => "string",
            TokType::FString => "f-string",
            TokType::Op => "operator",
            TokType::Comment => "comment",
            TokType::Newline => "newline",
            TokType::Indent => "indent",
            TokType::Dedent => "dedent",
            TokType::EndMarker => "end of input",
        };
        f.write_str(s)
    }
}

/// A token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokType,
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokType::Op && self.text == op
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokType::Name && self.text == keyword
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },

    #[error("unexpected character {ch:?}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent { offset: usize },

    #[error("unmatched {ch:?}")]
    UnmatchedBracket { ch: char, offset: usize },
}

impl TokError {
    /// Byte offset where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            TokError::UnterminatedString { offset }
            | TokError::UnexpectedCharacter { offset, .. }
            | TokError::InconsistentDedent { offset }
            | TokError::UnmatchedBracket { offset, .. } => *offset,
        }
    }
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:0[xX](?:_?[0-9a-fA-F])+|0[oO](?:_?[0-7])+|0[bB](?:_?[01])+|(?:(?:[0-9](?:_?[0-9])*)?\.[0-9](?:_?[0-9])*|[0-9](?:_?[0-9])*\.?)(?:[eE][+-]?[0-9](?:_?[0-9])*)?[jJ]?)",
    )
    .expect("number pattern is valid")
});

/// Operators, longest first within each length class.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "->", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "@=", "==", "!=", "<=", ">=", "**", "//", "<<", ">>", ":=", "+", "-", "*", "/", "%", "@",
    "&", "|", "^", "~", "<", ">", "(", ")", "[", "]", "{", "}", ",", ":", ".", ";", "=",
];

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

const TAB_SIZE: usize = 8;

/// Tokenize a whole source text.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TokError> {
    Tokenizer::new(source).collect()
}

/// Streaming tokenizer. Yields `Err` once and then stops.
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    at_line_start: bool,
    line_has_content: bool,
    pending: VecDeque<Token<'a>>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Tokenizer {
            source,
            pos: 0,
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            line_has_content: false,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn token(&self, kind: TokType, start: usize, end: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.source[start..end],
            start,
            end,
        }
    }

    fn push(&mut self, kind: TokType, start: usize, end: usize) {
        let token = self.token(kind, start, end);
        self.pending.push_back(token);
    }

    /// Measure leading whitespace starting at `from`. Returns (column, offset
    /// of first non-blank character).
    fn measure_indent(&self, from: usize) -> (usize, usize) {
        let mut col = 0;
        let mut offset = from;
        for b in self.source[from..].bytes() {
            match b {
                b' ' => col += 1,
                b'\t' => col = (col / TAB_SIZE + 1) * TAB_SIZE,
                b'\x0c' => col = 0,
                _ => break,
            }
            offset += 1;
        }
        (col, offset)
    }

    fn line_end(&self, from: usize) -> usize {
        memchr::memchr(b'\n', &self.source.as_bytes()[from..])
            .map(|i| from + i)
            .unwrap_or(self.source.len())
    }

    fn is_blank_or_comment_line(&self, offset: usize) -> Option<bool> {
        match self.source[offset..].bytes().next() {
            None => None,
            Some(b'\n') | Some(b'\r') => Some(true),
            Some(b'\\') => Some(false),
            Some(b'#') => Some(true),
            Some(_) => Some(false),
        }
    }

    /// Indentation of the next line holding code, or 0 at end of input.
    fn next_code_indent(&self, from: usize) -> usize {
        let mut line_start = from;
        loop {
            let (col, offset) = self.measure_indent(line_start);
            match self.is_blank_or_comment_line(offset) {
                None => return 0,
                Some(false) => return col,
                Some(true) => {
                    let end = self.line_end(offset);
                    if end >= self.source.len() {
                        return 0;
                    }
                    line_start = end + 1;
                }
            }
        }
    }

    fn indent_to(&mut self, col: usize, offset: usize) -> Result<(), TokError> {
        let top = self.indents.last().copied().unwrap_or(0);
        if col > top {
            self.indents.push(col);
            self.push(TokType::Indent, offset, offset);
            return Ok(());
        }
        while self.indents.last().copied().unwrap_or(0) > col {
            self.indents.pop();
            self.push(TokType::Dedent, offset, offset);
        }
        if self.indents.last().copied().unwrap_or(0) != col {
            return Err(TokError::InconsistentDedent { offset });
        }
        Ok(())
    }

    /// Handle the start of a physical line outside brackets.
    fn start_line(&mut self) -> Result<(), TokError> {
        loop {
            let (col, offset) = self.measure_indent(self.pos);
            match self.is_blank_or_comment_line(offset) {
                None => {
                    self.pos = offset;
                    self.at_line_start = false;
                    return Ok(());
                }
                Some(false) => {
                    self.pos = offset;
                    self.at_line_start = false;
                    return self.indent_to(col, offset);
                }
                Some(true) => {
                    let end = self.line_end(offset);
                    if self.source.as_bytes().get(offset) == Some(&b'#') {
                        let next = if end < self.source.len() {
                            self.next_code_indent(end + 1)
                        } else {
                            0
                        };
                        let top = self.indents.last().copied().unwrap_or(0);
                        if col == next {
                            self.indent_to(col, offset)?;
                        } else if col < top && next <= col && self.indents.contains(&col) {
                            self.indent_to(col, offset)?;
                        }
                        let text_end = trim_cr(self.source, offset, end);
                        self.push(TokType::Comment, offset, text_end);
                        self.push(TokType::Newline, text_end, end);
                    }
                    if end >= self.source.len() {
                        self.pos = self.source.len();
                        self.at_line_start = false;
                        return Ok(());
                    }
                    self.pos = end + 1;
                    if !self.pending.is_empty() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn lex_string(&mut self, start: usize, quote_at: usize, is_fstring: bool) -> Result<(), TokError> {
        let bytes = self.source.as_bytes();
        let quote = bytes[quote_at];
        let triple = bytes.get(quote_at + 1) == Some(&quote) && bytes.get(quote_at + 2) == Some(&quote);
        let mut i = quote_at + if triple { 3 } else { 1 };
        loop {
            let Some(&b) = bytes.get(i) else {
                return Err(TokError::UnterminatedString { offset: start });
            };
            match b {
                b'\\' => i += 2,
                b'\n' if !triple => {
                    return Err(TokError::UnterminatedString { offset: start });
                }
                _ if b == quote => {
                    if !triple {
                        i += 1;
                        break;
                    }
                    if bytes.get(i + 1) == Some(&quote) && bytes.get(i + 2) == Some(&quote) {
                        i += 3;
                        break;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        let kind = if is_fstring {
            TokType::FString
        } else {
            TokType::String
        };
        self.push(kind, start, i);
        self.pos = i;
        Ok(())
    }

    fn lex_op(&mut self, start: usize) -> Result<(), TokError> {
        let rest = self.rest();
        let Some(op) = OPERATORS.iter().copied().find(|op| rest.starts_with(op)) else {
            let ch = rest.chars().next().unwrap_or('\0');
            return Err(TokError::UnexpectedCharacter { ch, offset: start });
        };
        let ch = op.chars().next().unwrap_or('\0');
        match ch {
            '(' | '[' | '{' => self.brackets.push((ch, start)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => return Err(TokError::UnmatchedBracket { ch, offset: start }),
                }
            }
            _ => {}
        }
        self.push(TokType::Op, start, start + op.len());
        self.pos = start + op.len();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TokError> {
        if let Some(&(ch, offset)) = self.brackets.last() {
            return Err(TokError::UnmatchedBracket { ch, offset });
        }
        let end = self.source.len();
        if self.line_has_content {
            self.push(TokType::Newline, end, end);
            self.line_has_content = false;
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokType::Dedent, end, end);
        }
        self.push(TokType::EndMarker, end, end);
        self.finished = true;
        Ok(())
    }

    /// Lex until at least one token is pending.
    fn fill(&mut self) -> Result<(), TokError> {
        while self.pending.is_empty() && !self.finished {
            if self.at_line_start && self.brackets.is_empty() {
                self.start_line()?;
                continue;
            }
            let Some(ch) = self.peek_char() else {
                self.finish()?;
                continue;
            };
            let start = self.pos;
            match ch {
                ' ' | '\t' | '\x0c' => self.pos += 1,
                '\r' => self.pos += 1,
                '\n' => {
                    self.pos += 1;
                    if self.brackets.is_empty() {
                        if self.line_has_content {
                            self.push(TokType::Newline, start, start + 1);
                            self.line_has_content = false;
                        }
                        self.at_line_start = true;
                    }
                }
                '\\' => {
                    let next = self.source[start + 1..].trim_start_matches('\r');
                    if next.starts_with('\n') {
                        self.pos = self.source.len() - next.len() + 1;
                    } else {
                        return Err(TokError::UnexpectedCharacter { ch, offset: start });
                    }
                }
                '#' => {
                    let end = self.line_end(start);
                    let text_end = trim_cr(self.source, start, end);
                    if self.brackets.is_empty() {
                        self.push(TokType::Comment, start, text_end);
                    }
                    self.pos = text_end;
                }
                '"' | '\'' => {
                    self.line_has_content = true;
                    self.lex_string(start, start, false)?;
                }
                c if c.is_ascii_digit() => {
                    self.line_has_content = true;
                    self.lex_number(start)?;
                }
                '.' if self.rest()[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                    self.line_has_content = true;
                    self.lex_number(start)?;
                }
                c if is_identifier_start(c) => {
                    self.line_has_content = true;
                    let len = self
                        .rest()
                        .char_indices()
                        .find(|(_, c)| !is_identifier_continue(*c))
                        .map(|(i, _)| i)
                        .unwrap_or(self.rest().len());
                    let end = start + len;
                    let word = &self.source[start..end];
                    let quote_follows = matches!(self.source.as_bytes().get(end), Some(b'"' | b'\''));
                    let lower = word.to_ascii_lowercase();
                    if quote_follows && STRING_PREFIXES.contains(&lower.as_str()) {
                        self.lex_string(start, end, lower.contains('f'))?;
                    } else {
                        self.push(TokType::Name, start, end);
                        self.pos = end;
                    }
                }
                _ => {
                    self.line_has_content = true;
                    self.lex_op(start)?;
                }
            }
        }
        Ok(())
    }

    fn lex_number(&mut self, start: usize) -> Result<(), TokError> {
        let Some(m) = NUMBER.find(self.rest()) else {
            let ch = self.peek_char().unwrap_or('\0');
            return Err(TokError::UnexpectedCharacter { ch, offset: start });
        };
        let end = start + m.end();
        self.push(TokType::Number, start, end);
        self.pos = end;
        Ok(())
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, TokError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() && self.finished {
            return None;
        }
        if let Err(err) = self.fill() {
            self.pending.clear();
            self.finished = true;
            return Some(Err(err));
        }
        self.pending.pop_front().map(Ok)
    }
}

fn trim_cr(source: &str, start: usize, end: usize) -> usize {
    if end > start && source.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
