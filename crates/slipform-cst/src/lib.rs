// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree library for slipform.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_module`] turns source text into an arena [`Tree`].
//! - **Code Generation**: [`render`] writes any subtree back as canonical
//!   source.
//! - **Rewriting**: the [`visitor`] module walks a tree and dispatches each
//!   node to a [`Transformer`](visitor::Transformer) handler.
//!
//! # Quick Start
//!
//! ```
//! use slipform_cst::{parse_module, render};
//!
//! let source = "def f(a):\n    b = a + 1\n    return b\n";
//! let tree = parse_module(source).expect("parse error");
//! let root = tree.root().expect("module root");
//! assert_eq!(render(&tree, root), source);
//! ```

mod codegen;
pub use codegen::{render, CodegenState};

mod nodes;
pub use nodes::*;

mod parser;
pub use parser::{parse_module, prettify_error, ParserError};

/// Tokenizer for the host grammar.
pub mod tokenizer;
pub use tokenizer::{tokenize, TokError, TokType, Token};

/// Walker, transformer and dispatch infrastructure.
pub mod visitor;

/// Parse and link a module, ready for rewriting.
///
/// Returns the tree and its root.
pub fn parse_linked(source: &str) -> Result<(Tree, NodeId), ParserError> {
    let mut tree = parse_module(source)?;
    let root = tree
        .root()
        .ok_or_else(|| ParserError::UnexpectedToken {
            expected: "a module".to_string(),
            found: "nothing".to_string(),
            span: slipform_core::span::Span::default(),
        })?;
    tree.link_parents(root);
    Ok((tree, root))
}
