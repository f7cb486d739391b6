//! CLI front door.
//!
//! Provides the command implementations behind the `slipform` binary:
//! - `translate` - print the translated source, a JSON envelope, or a diff
//! - `build` - translate, compile and instantiate, printing the graph as JSON
//!
//! ## Error Handling
//!
//! All functions return `Result<T, SlipformError>`. The `SlipformError` type
//! provides stable error codes for JSON output.

use std::fs;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use slipform_core::diff::generate_unified_diff;
use slipform_core::error::SlipformError;
use slipform_core::output::{
    BuildResponse, DiagnosticOutput, GraphNodeOutput, Location, ScopeEntryOutput,
    TranslateResponse, SCHEMA_VERSION,
};
use slipform_core::text::byte_offset_to_position_str;
use slipform_cst::visitor::Diagnostic;
use slipform_graph::{Graph, GraphCompiler};
use slipform_translate::{TranslateOptions, TranslatedUnit};
use tracing::info;

use crate::error_bridges::translate_error;

/// Output format for the `translate` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TranslateFormat {
    /// Translated source text (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
    /// Unified diff against the original source.
    Diff,
}

/// Read a source file.
pub fn read_source(path: &Path) -> Result<String, SlipformError> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => SlipformError::file_not_found(path.display().to_string()),
        _ => SlipformError::from(err),
    })
}

fn diagnostic_output(diagnostic: &Diagnostic, source: &str) -> DiagnosticOutput {
    let location = diagnostic.span.map(|span| {
        let (line, col) = byte_offset_to_position_str(source, span.start);
        Location::new(line, col)
    });
    DiagnosticOutput {
        severity: diagnostic.severity.to_string(),
        pass: diagnostic.pass.to_string(),
        node_kind: diagnostic.kind.to_string(),
        message: diagnostic.message.clone(),
        location,
    }
}

fn diagnostics(unit: &TranslatedUnit) -> Vec<DiagnosticOutput> {
    unit.diagnostics()
        .map(|d| diagnostic_output(d, unit.original_source()))
        .collect()
}

/// JSON envelope for a translated unit.
pub fn translate_response(unit: &TranslatedUnit) -> TranslateResponse {
    TranslateResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        original_name: unit.original_name().to_string(),
        unit_name: unit.unit_name().to_string(),
        fingerprint: unit.fingerprint().to_string(),
        parameters: unit.parameters().to_vec(),
        scope: unit
            .scope()
            .entries()
            .iter()
            .map(|entry| ScopeEntryOutput {
                name: entry.name.clone(),
                origin: entry.origin.to_string(),
            })
            .collect(),
        diagnostics: diagnostics(unit),
        source: unit.translated_source().to_string(),
    }
}

/// JSON envelope for a built graph.
pub fn build_response(unit: &TranslatedUnit, graph: &Graph) -> BuildResponse {
    let nodes = graph
        .nodes()
        .map(|(idx, node)| GraphNodeOutput {
            id: idx.index(),
            kind: node.kind.kind_name().to_string(),
            label: node.kind.label(),
            name: node.name.clone(),
            inputs: graph.inputs(idx).into_iter().map(|i| i.index()).collect(),
        })
        .collect();
    BuildResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        unit_name: unit.unit_name().to_string(),
        nodes,
        outputs: graph.outputs().iter().map(|i| i.index()).collect(),
        diagnostics: diagnostics(unit),
    }
}

fn translate_file(
    path: &Path,
    options: &TranslateOptions,
) -> Result<(String, TranslatedUnit), SlipformError> {
    let source = read_source(path)?;
    let label = path.display().to_string();
    let unit = TranslatedUnit::translate(&source, options)
        .map_err(|err| translate_error(err, &source, &label))?;
    info!(
        file = %label,
        unit = unit.unit_name(),
        diagnostics = unit.diagnostics().count(),
        "translated"
    );
    Ok((label, unit))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SlipformError> {
    serde_json::to_string_pretty(value).map_err(|e| SlipformError::internal(e.to_string()))
}

/// Translate the definition in `path` and render it in `format`.
pub fn run_translate(
    path: &Path,
    options: &TranslateOptions,
    format: TranslateFormat,
) -> Result<String, SlipformError> {
    let (label, unit) = translate_file(path, options)?;
    match format {
        TranslateFormat::Text => Ok(unit.translated_source().to_string()),
        TranslateFormat::Json => to_json(&translate_response(&unit)),
        TranslateFormat::Diff => Ok(generate_unified_diff(
            &label,
            unit.original_source(),
            unit.translated_source(),
        )),
    }
}

/// Translate, compile and instantiate the definition in `path`.
pub fn run_build(path: &Path, options: &TranslateOptions) -> Result<String, SlipformError> {
    let (label, unit) = translate_file(path, options)?;
    let program = unit
        .compile(&GraphCompiler::new(options.clone()))
        .map_err(|err| translate_error(err, unit.original_source(), &label))?;
    let graph = program.instantiate()?;
    to_json(&build_response(&unit, &graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("f.py");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn translate_text_and_diff() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "def f():\n    a = 5\n    return a\n");
        let options = TranslateOptions::default();

        let text = run_translate(&path, &options, TranslateFormat::Text).unwrap();
        assert!(text.contains("a = graph.constant(5)\n    a.set_name('a')\n"));

        let diff = run_translate(&path, &options, TranslateFormat::Diff).unwrap();
        assert!(diff.contains("-    a = 5\n"));
        assert!(diff.contains("+    a.set_name('a')\n"));
    }

    #[test]
    fn translate_json_reports_scope_and_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "def f(x):\n    y = x < 1 < 2\n    return y\n");
        let json = run_translate(&path, &TranslateOptions::default(), TranslateFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["parameters"][0], "x");
        assert_eq!(value["scope"][0]["origin"], "parameter");
        assert_eq!(value["diagnostics"][0]["location"]["line"], 2);
        assert_eq!(value["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn build_emits_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "def f():\n    a = 5\n    b = a + 1\n    return b\n");
        let json = run_build(&path, &TranslateOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        let named: Vec<&str> = nodes.iter().filter_map(|n| n["name"].as_str()).collect();
        assert_eq!(named, vec!["a", "b"]);
        assert_eq!(value["outputs"][0], 2);
    }

    #[test]
    fn missing_file() {
        let err = run_build(Path::new("/nonexistent/f.py"), &TranslateOptions::default())
            .unwrap_err();
        assert!(matches!(err, SlipformError::FileNotFound { .. }));
    }
}
