//! Rewrites one imperative definition into code that builds a dataflow
//! graph.
//!
//! # Overview
//!
//! - [`translate`] parses a definition and runs the rewrite passes, returning
//!   a [`Translation`] with the rewritten tree, rendered source, scope and
//!   per-pass reports.
//! - [`TranslatedUnit`] binds a translation to a fresh identity from the
//!   [`UnitRegistry`] and hands it to a [`Compiler`].
//!
//! Hard failures are [`TranslateError`]s. Per-node problems are reported as
//! diagnostics and leave the offending node untranslated.
//!
//! ```
//! use slipform_translate::{translate, TranslateOptions};
//!
//! let out = translate("def f(a):\n    b = a + 1\n    return b\n", &TranslateOptions::default())
//!     .expect("translation");
//! assert!(out.source.contains("b.set_name('b')"));
//! ```

pub mod error;
pub mod options;
pub mod passes;
pub mod registry;
pub mod scope;
mod translate;
mod unit;

pub use error::TranslateError;
pub use options::TranslateOptions;
pub use registry::{UnitHandle, UnitId, UnitRegistry};
pub use scope::{Scope, ScopeEntry, ScopeOrigin};
pub use translate::{translate, Translation, DEBUG_TARGET};
pub use unit::{fingerprint, Compiler, TranslatedUnit};
