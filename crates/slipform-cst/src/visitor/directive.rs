// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! In-source directives carried by statement comments.

/// Payload that marks the next statement as excluded from rewriting.
pub const IGNORE_PAYLOAD: &str = "[ignore]";

/// A recognized directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Skip the following sibling statement and its whole subtree.
    IgnoreNext,
}

impl Directive {
    /// Recognize a directive in comment text.
    ///
    /// The comment marker is optional; surrounding whitespace is ignored.
    /// Anything other than an exact payload match is ordinary text.
    pub fn from_comment(text: &str) -> Option<Directive> {
        let text = text.trim();
        let payload = text.strip_prefix('#').unwrap_or(text).trim();
        match payload {
            IGNORE_PAYLOAD => Some(Directive::IgnoreNext),
            _ => None,
        }
    }
}
