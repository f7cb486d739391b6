use slipform_core::error::SlipformError;
use slipform_cst::{NodeKind, ParserError};
use thiserror::Error;

/// The translated text could not be turned into a program.
#[derive(Debug, Error)]
pub enum GraphCompileError {
    #[error("translated source does not parse: {0}")]
    Parse(#[from] ParserError),

    #[error("no definition named {unit} in the translated source")]
    MissingDefinition { unit: String },

    #[error("translated definition still declares {count} parameters")]
    Parameters { count: usize },

    #[error("{kind} statement at line {line} cannot be evaluated into a graph")]
    UnsupportedStatement { kind: NodeKind, line: u32 },
}

/// Evaluation of a compiled program failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unsupported during graph construction: {what}")]
    Unsupported { what: String },

    #[error("name '{name}' is not bound to a graph value")]
    UnboundName { name: String },

    #[error("'{what}' is not a graph value")]
    NotAValue { what: String },

    #[error("{method}() takes {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("{method}() expects a literal argument")]
    ExpectedLiteral { method: String },

    #[error("cannot unpack {found} values into {expected} targets")]
    Destructure { expected: usize, found: usize },
}

impl From<GraphCompileError> for SlipformError {
    fn from(err: GraphCompileError) -> Self {
        SlipformError::CompileError {
            message: err.to_string(),
        }
    }
}

impl From<EvalError> for SlipformError {
    fn from(err: EvalError) -> Self {
        SlipformError::EvaluationError {
            message: err.to_string(),
        }
    }
}
