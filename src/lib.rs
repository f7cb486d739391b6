//! Slipform - rewrite imperative definitions into dataflow-graph builders.
//!
//! This crate is the front door over the workspace crates:
//!
//! - `slipform-cst` parses and renders the host grammar
//! - `slipform-translate` runs the rewrite passes and mints unit identities
//! - `slipform-graph` compiles translated units and evaluates them into graphs
//!
//! ## Modules
//!
//! - `cli` - command implementations returning output text
//! - `config` - TOML settings file and command-line overrides

pub mod cli;
pub mod config;
mod error_bridges;

pub use error_bridges::{config_error, parse_error, translate_error};

// Re-export core types for convenience
pub use slipform_core::error::{OutputErrorCode, SlipformError};
pub use slipform_core::output::{
    BuildResponse, ErrorInfo, ErrorResponse, Location, TranslateResponse, SCHEMA_VERSION,
};
pub use slipform_graph::{Graph, GraphCompiler, GraphProgram};
pub use slipform_translate::{
    translate, Compiler, TranslateError, TranslateOptions, TranslatedUnit, Translation,
};

/// Translate `source`, compile it with [`GraphCompiler`] and build its graph.
pub fn build(
    source: &str,
    options: &TranslateOptions,
) -> Result<(TranslatedUnit, Graph), SlipformError> {
    let unit = TranslatedUnit::translate(source, options)
        .map_err(|err| translate_error(err, source, "<source>"))?;
    let program = unit
        .compile(&GraphCompiler::new(options.clone()))
        .map_err(|err| translate_error(err, source, "<source>"))?;
    let graph = program.instantiate()?;
    Ok((unit, graph))
}
