//! Error bridge implementations for layer errors.
//!
//! The `From` conversions into `SlipformError` live next to each layer's
//! error type. The bridges here need more than the error itself: the source
//! text to locate parse failures, or a foreign error type such as
//! `toml::de::Error`.

use slipform_core::error::SlipformError;
use slipform_cst::{prettify_error, ParserError};
use slipform_translate::TranslateError;

// ============================================================================
// Bridge: ParserError -> SlipformError
// ============================================================================

/// Convert a parser error, locating it in `source`.
pub fn parse_error(err: &ParserError, source: &str, label: &str) -> SlipformError {
    let (line, col) = err.position(source);
    SlipformError::ParseError {
        message: err.to_string(),
        line,
        col,
        snippet: Some(prettify_error(err, source, label)),
    }
}

// ============================================================================
// Bridge: TranslateError -> SlipformError
// ============================================================================

/// Convert a translation error, locating parse failures in `source`.
pub fn translate_error(err: TranslateError, source: &str, label: &str) -> SlipformError {
    match err {
        TranslateError::Parse(parse) => parse_error(&parse, source, label),
        other => SlipformError::from(other),
    }
}

// ============================================================================
// Bridge: config errors -> SlipformError
// ============================================================================

/// Convert a settings file parse failure.
pub fn config_error(err: toml::de::Error) -> SlipformError {
    SlipformError::InvalidArguments {
        message: format!("invalid config: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipform_core::error::OutputErrorCode;
    use slipform_translate::{translate, TranslateOptions};

    #[test]
    fn parse_errors_are_located() {
        let source = "def f():\n    a = = 1\n";
        let err = translate(source, &TranslateOptions::default()).unwrap_err();
        let err = translate_error(err, source, "f.py");
        match &err {
            SlipformError::ParseError {
                line, snippet, ..
            } => {
                assert_eq!(*line, 2);
                assert!(snippet.as_deref().unwrap_or_default().contains("f.py"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(OutputErrorCode::from(&err).code(), 3);
    }

    #[test]
    fn translation_failures_map_to_code_4() {
        let err = translate("def f(*a):\n    pass\n", &TranslateOptions::default()).unwrap_err();
        let err = SlipformError::from(err);
        assert_eq!(OutputErrorCode::from(&err).code(), 4);
    }

    #[test]
    fn evaluation_failures_map_to_code_5() {
        let err = SlipformError::from(slipform_graph::EvalError::UnboundName {
            name: "x".to_string(),
        });
        assert_eq!(OutputErrorCode::from(&err).code(), 5);
    }

    #[test]
    fn config_failures_map_to_code_2() {
        let err = toml::from_str::<toml::Table>("[translate\n").unwrap_err();
        let err = config_error(err);
        assert!(err.to_string().starts_with("invalid arguments: invalid config:"));
        assert_eq!(OutputErrorCode::from(&err).code(), 2);
    }
}
