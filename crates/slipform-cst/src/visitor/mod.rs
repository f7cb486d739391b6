// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal and rewrite infrastructure.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order**, children left-to-right in source order
//! - A handler may stop descent into the node it was given
//! - Nodes inserted next to the current node during a pass are not visited
//!   by that pass
//!
//! # Transformer Pattern
//!
//! ```ignore
//! use slipform_cst::visitor::{Dispatcher, Transformer, VisitOutcome, RewriteError};
//! use slipform_cst::{NodeId, Tree};
//!
//! struct NameCounter {
//!     count: usize,
//! }
//!
//! impl Transformer for NameCounter {
//!     fn pass_name(&self) -> &'static str {
//!         "count-names"
//!     }
//!
//!     fn visit_name(&mut self, _tree: &mut Tree, _node: NodeId) -> Result<VisitOutcome, RewriteError> {
//!         self.count += 1;
//!         Ok(VisitOutcome::unchanged())
//!     }
//! }
//! ```

mod directive;
mod dispatch;
mod traits;
mod walker;

pub use directive::{Directive, IGNORE_PAYLOAD};
pub use dispatch::{Diagnostic, Dispatcher, Severity, TransformReport};
pub use traits::{dispatch_handler, Rewrite, RewriteError, Transformer, VisitOutcome};
pub use walker::{walk, NodeIter, Walk};
