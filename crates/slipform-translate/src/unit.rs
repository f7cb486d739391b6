//! Translated units and the compile boundary.

use sha2::{Digest, Sha256};
use slipform_cst::visitor::Diagnostic;
use slipform_cst::{render, Node};
use tracing::{debug, warn};

use crate::error::TranslateError;
use crate::options::TranslateOptions;
use crate::registry::{UnitHandle, UnitId, UnitRegistry};
use crate::scope::Scope;
use crate::translate::{translate, Translation};

/// Turns a translated unit into something executable.
pub trait Compiler {
    type Artifact;
    type Error: std::error::Error;

    fn compile(&self, unit: &TranslatedUnit) -> Result<Self::Artifact, Self::Error>;
}

/// A translation bound to a registered identity.
///
/// Translate once with [`TranslatedUnit::translate`], then compile the unit
/// and instantiate the artifact as often as needed.
#[derive(Debug)]
pub struct TranslatedUnit {
    handle: UnitHandle,
    original_source: String,
    translation: Translation,
    fingerprint: String,
}

/// Hex SHA-256 of `text`.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

impl TranslatedUnit {
    /// Translate `source` and register it with the process-wide registry.
    pub fn translate(source: &str, options: &TranslateOptions) -> Result<Self, TranslateError> {
        Self::translate_in(UnitRegistry::global(), source, options)
    }

    /// Translate `source` and register it with `registry`.
    pub fn translate_in(
        registry: &UnitRegistry,
        source: &str,
        options: &TranslateOptions,
    ) -> Result<Self, TranslateError> {
        let translation = translate(source, options)?;
        let handle = registry.register(&translation.name);
        let fingerprint = fingerprint(&translation.source);
        debug!(unit = handle.unit_name(), %fingerprint, "unit registered");
        Ok(Self {
            handle,
            original_source: source.to_string(),
            translation,
            fingerprint,
        })
    }

    pub fn id(&self) -> UnitId {
        self.handle.id()
    }

    /// Minted name the unit compiles under.
    pub fn unit_name(&self) -> &str {
        self.handle.unit_name()
    }

    pub fn original_name(&self) -> &str {
        &self.translation.name
    }

    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    pub fn translated_source(&self) -> &str {
        &self.translation.source
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn parameters(&self) -> &[String] {
        &self.translation.parameters
    }

    pub fn scope(&self) -> &Scope {
        &self.translation.scope
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.translation.diagnostics()
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    /// Render the definition alone, renamed to the minted unit name.
    pub fn render_for_compile(&self) -> String {
        let mut tree = self.translation.tree.clone();
        let def = self.translation.definition;
        if let Some(Node::FunctionDef { name, .. }) = tree.get_mut(def) {
            *name = self.unit_name().to_string();
        }
        render(&tree, def)
    }

    /// Compile with `compiler`. A failure carries the original source.
    pub fn compile<C: Compiler>(&self, compiler: &C) -> Result<C::Artifact, TranslateError> {
        compiler.compile(self).map_err(|err| {
            warn!(unit = self.unit_name(), error = %err, "compile failed");
            TranslateError::Compile {
                unit: self.unit_name().to_string(),
                message: err.to_string(),
                original_source: self.original_source.clone(),
            }
        })
    }
}
