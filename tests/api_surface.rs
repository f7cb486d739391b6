//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Front Door
// ============================================================================

use slipform::cli::{build_response, read_source, run_build, run_translate, translate_response, TranslateFormat};
use slipform::config::{CliOverrides, SlipformConfig};
use slipform::{
    build, config_error, parse_error, translate, translate_error, BuildResponse, Compiler,
    ErrorInfo, ErrorResponse, Graph, GraphCompiler, GraphProgram, Location, OutputErrorCode,
    SlipformError, TranslateError, TranslateOptions, TranslateResponse, TranslatedUnit,
    Translation, SCHEMA_VERSION,
};

// ============================================================================
// Core Infrastructure Types
// ============================================================================

use slipform_core::diff::generate_unified_diff;
use slipform_core::output::{emit_response, DiagnosticOutput, GraphNodeOutput, ScopeEntryOutput};
use slipform_core::span::Span;
use slipform_core::text::{byte_offset_to_position_str, line_count, line_start_offset_str};

// ============================================================================
// Syntax Tree
// ============================================================================

use slipform_cst::visitor::{
    dispatch_handler, walk, Diagnostic, Directive, Dispatcher, NodeIter, Rewrite, RewriteError,
    Severity, TransformReport, Transformer, VisitOutcome, Walk, IGNORE_PAYLOAD,
};
use slipform_cst::{
    parse_linked, parse_module, prettify_error, render, tokenize, BinaryOp, BoolOp, CodegenState,
    CompOp, ConstantKind, Node, NodeId, NodeKind, ParamKind, ParserError, TokError, TokType,
    Token, Tree, TreeError, UnaryOp,
};

// ============================================================================
// Translation
// ============================================================================

use slipform_translate::passes::{
    flatten_target, inject_placeholders, validate_parameters, RegisterBindings,
    RewriteMembership, StripDecorators, WrapConstants,
};
use slipform_translate::{
    fingerprint, Scope, ScopeEntry, ScopeOrigin, UnitHandle, UnitId, UnitRegistry, DEBUG_TARGET,
};

// ============================================================================
// Graph
// ============================================================================

use slipform_graph::{EvalError, GraphCompileError, GraphNode, GraphNodeKind};

#[test]
fn api_surface_compiles() {
    // This test exists only to verify that all the imports above compile.
}

#[test]
fn build_front_door() {
    let (unit, graph) = build(
        "def f(x):\n    y = x + 1\n    return y\n",
        &TranslateOptions::default(),
    )
    .unwrap();
    assert_eq!(unit.parameters(), ["x".to_string()]);
    assert_eq!(graph.placeholders(), vec!["x"]);
    assert!(graph.find("y").is_some());
}
