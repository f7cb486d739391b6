//! Hard translation failures.
//!
//! Anything in this enum aborts translation and yields no unit. Per-node
//! problems are reported as diagnostics instead and never reach here.

use slipform_core::error::SlipformError;
use slipform_cst::{ParserError, TreeError};
use thiserror::Error;

pub const BEGIN_SOURCE: &str = "---- begin source ----";
pub const END_SOURCE: &str = "---- end source ----";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("parse error: {0}")]
    Parse(#[from] ParserError),

    #[error("malformed definition: found {found}: {detail}")]
    MalformedTopLevel { found: String, detail: String },

    #[error("unsupported parameter '{name}': {reason}")]
    UnsupportedParameter { name: String, reason: String },

    #[error("tree edit failed: {0}")]
    Tree(#[from] TreeError),

    #[error(
        "failed to compile {unit}: {message}\n{begin}\n{original_source}\n{end}",
        begin = BEGIN_SOURCE,
        end = END_SOURCE
    )]
    Compile {
        unit: String,
        message: String,
        original_source: String,
    },
}

impl From<TranslateError> for SlipformError {
    fn from(err: TranslateError) -> Self {
        match err {
            // Without the source text the position is unknown.
            TranslateError::Parse(parse) => SlipformError::ParseError {
                message: parse.to_string(),
                line: 0,
                col: 0,
                snippet: None,
            },
            TranslateError::MalformedTopLevel { .. }
            | TranslateError::UnsupportedParameter { .. } => SlipformError::TranslationError {
                message: err.to_string(),
            },
            TranslateError::Compile { .. } => SlipformError::CompileError {
                message: err.to_string(),
            },
            TranslateError::Tree(tree) => SlipformError::InternalError {
                message: format!("tree edit failed: {tree}"),
            },
        }
    }
}
