//! JSON output types for CLI responses.
//!
//! All responses carry `status` and `schema_version`; errors are reported
//! through [`ErrorResponse`] so agents can always parse stdout as JSON.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, SlipformError};

/// Current JSON schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Shared Types
// ============================================================================

/// A 1-indexed source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(line: u32, col: u32) -> Self {
        Location { line, col }
    }
}

/// A recoverable problem reported during translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticOutput {
    /// `"warning"` or `"error"`.
    pub severity: String,
    /// The pass that reported the problem.
    pub pass: String,
    /// Kind of the node the problem is attached to.
    pub node_kind: String,
    /// Human-readable message.
    pub message: String,
    /// Where the node starts, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A scope entry as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntryOutput {
    /// The bound or referenced name.
    pub name: String,
    /// `"parameter"`, `"local"` or `"external"`.
    pub origin: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a SlipformError.
    pub fn from_error(err: &SlipformError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            SlipformError::ParseError {
                line, col, snippet, ..
            } => (
                snippet
                    .as_ref()
                    .map(|s| serde_json::json!({ "snippet": s })),
                Some(Location::new(*line, *col)),
            ),
            SlipformError::FileNotFound { path } => {
                (Some(serde_json::json!({ "path": path })), None)
            }
            _ => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Error details.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Build an error response for a SlipformError.
    pub fn from_error(err: &SlipformError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `translate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    /// Status (`"ok"`).
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Name of the original definition.
    pub original_name: String,
    /// Minted name of the translated unit.
    pub unit_name: String,
    /// SHA-256 of the translated source (hex).
    pub fingerprint: String,
    /// Parameters turned into placeholders, in declared order.
    pub parameters: Vec<String>,
    /// Scope entries in first-seen order.
    pub scope: Vec<ScopeEntryOutput>,
    /// Recoverable problems encountered while translating.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<DiagnosticOutput>,
    /// The translated source.
    pub source: String,
}

/// Summary of one graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNodeOutput {
    /// Node index.
    pub id: usize,
    /// `"constant"`, `"placeholder"` or `"operation"`.
    pub kind: String,
    /// Literal text, placeholder name or operation name.
    pub label: String,
    /// Name the node was registered under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Input node indices, in argument order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inputs: Vec<usize>,
}

/// Response for the `build` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResponse {
    /// Status (`"ok"`).
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Minted name of the translated unit.
    pub unit_name: String,
    /// Graph nodes in creation order.
    pub nodes: Vec<GraphNodeOutput>,
    /// Node indices returned by the definition.
    pub outputs: Vec<usize>,
    /// Recoverable translation problems.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<DiagnosticOutput>,
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_code_and_location() {
        let err = SlipformError::ParseError {
            message: "unexpected token".to_string(),
            line: 2,
            col: 7,
            snippet: Some("2 |     a = = 1".to_string()),
        };
        let response = ErrorResponse::from_error(&err);

        assert_eq!(response.status, "error");
        assert_eq!(response.error.code, 3);
        assert_eq!(response.error.location, Some(Location::new(2, 7)));
        assert!(response.error.details.is_some());
    }

    #[test]
    fn emit_response_writes_pretty_json() {
        let response = ErrorResponse::from_error(&SlipformError::internal("boom"));
        let mut buf = Vec::new();
        emit_response(&response, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["error"]["code"], 10);
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
    }

    #[test]
    fn empty_diagnostics_are_omitted() {
        let response = TranslateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            original_name: "f".to_string(),
            unit_name: "_slipform_1".to_string(),
            fingerprint: "00".to_string(),
            parameters: vec![],
            scope: vec![],
            diagnostics: vec![],
            source: "def f():\n    pass\n".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("diagnostics").is_none());
    }
}
