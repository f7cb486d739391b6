//! Reference graph collaborator for slipform.
//!
//! [`GraphCompiler`] compiles a
//! [`TranslatedUnit`](slipform_translate::TranslatedUnit) into a
//! [`GraphProgram`]; [`GraphProgram::instantiate`] evaluates it into a
//! [`Graph`] backed by `petgraph`.
//!
//! ```
//! use slipform_graph::GraphCompiler;
//! use slipform_translate::{TranslateOptions, TranslatedUnit};
//!
//! let source = "def f():\n    a = 5\n    b = a + 1\n    return b\n";
//! let unit = TranslatedUnit::translate(source, &TranslateOptions::default()).expect("translate");
//! let program = unit.compile(&GraphCompiler::default()).expect("compile");
//! let graph = program.instantiate().expect("instantiate");
//! assert_eq!(graph.named_nodes().len(), 2);
//! ```

mod compiler;
mod error;
mod eval;
mod graph;

pub use compiler::{GraphCompiler, GraphProgram};
pub use error::{EvalError, GraphCompileError};
pub use graph::{Graph, GraphNode, GraphNodeKind};
