//! Error types and error code constants for slipform.
//!
//! This module provides a unified error type (`SlipformError`) that bridges
//! domain-specific errors from the parser, the translator and the graph
//! collaborator into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Parse errors (source is not well formed)
//! - `4`: Translation errors (unsupported definition shape or parameters)
//! - `5`: Compile or evaluation errors (translated unit failed downstream)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `SlipformError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for SlipformError` lives next to the types it bridges
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, unreadable config).
    InvalidArguments = 2,
    /// The source text could not be parsed.
    ParseError = 3,
    /// The definition could not be translated.
    TranslationError = 4,
    /// The translated unit failed to compile or evaluate.
    CompileError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum SlipformError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Source text failed to parse.
    #[error("parse error at {line}:{col}: {message}")]
    ParseError {
        message: String,
        line: u32,
        col: u32,
        snippet: Option<String>,
    },

    /// Translation aborted.
    #[error("translation error: {message}")]
    TranslationError { message: String },

    /// The translated unit failed to compile.
    #[error("compile error: {message}")]
    CompileError { message: String },

    /// The compiled unit failed while building its graph.
    #[error("evaluation error: {message}")]
    EvaluationError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&SlipformError> for OutputErrorCode {
    fn from(err: &SlipformError) -> Self {
        match err {
            SlipformError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            SlipformError::FileNotFound { .. } => OutputErrorCode::InvalidArguments,
            SlipformError::ParseError { .. } => OutputErrorCode::ParseError,
            SlipformError::TranslationError { .. } => OutputErrorCode::TranslationError,
            SlipformError::CompileError { .. } => OutputErrorCode::CompileError,
            SlipformError::EvaluationError { .. } => OutputErrorCode::CompileError,
            SlipformError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<SlipformError> for OutputErrorCode {
    fn from(err: SlipformError) -> Self {
        OutputErrorCode::from(&err)
    }
}

impl From<std::io::Error> for SlipformError {
    fn from(err: std::io::Error) -> Self {
        SlipformError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl SlipformError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        SlipformError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SlipformError::InternalError {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        SlipformError::FileNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
        assert_eq!(OutputErrorCode::ParseError.code(), 3);
        assert_eq!(OutputErrorCode::TranslationError.code(), 4);
        assert_eq!(OutputErrorCode::CompileError.code(), 5);
        assert_eq!(OutputErrorCode::InternalError.code(), 10);
    }

    #[test]
    fn evaluation_errors_share_the_compile_code() {
        let err = SlipformError::EvaluationError {
            message: "unbound name 'q'".to_string(),
        };
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::CompileError);
    }

    #[test]
    fn parse_error_display_includes_position() {
        let err = SlipformError::ParseError {
            message: "expected ':'".to_string(),
            line: 3,
            col: 9,
            snippet: None,
        };
        assert_eq!(err.to_string(), "parse error at 3:9: expected ':'");
    }
}
