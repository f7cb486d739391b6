//! Translation settings.

use serde::{Deserialize, Serialize};

/// Settings that shape the generated graph-building code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Identifier of the graph-building namespace (`graph.constant(...)`).
    pub namespace: String,
    /// Method each named binding calls to announce itself.
    pub announce_method: String,
    /// Locals starting with this prefix are never announced.
    pub discard_prefix: String,
    /// Emit the translated source on the `slipform::debug` log target.
    pub debug: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            namespace: "graph".to_string(),
            announce_method: "set_name".to_string(),
            discard_prefix: "_".to_string(),
            debug: false,
        }
    }
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_announce_method(mut self, method: impl Into<String>) -> Self {
        self.announce_method = method.into();
        self
    }

    pub fn with_discard_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discard_prefix = prefix.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Whether a local binding is announced to the graph.
    pub fn is_announced(&self, name: &str) -> bool {
        self.discard_prefix.is_empty() || !name.starts_with(&self.discard_prefix)
    }
}
