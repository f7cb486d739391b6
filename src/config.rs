//! CLI settings.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags:
//!
//! ```toml
//! [translate]
//! namespace = "graph"
//! announce_method = "set_name"
//! discard_prefix = "_"
//! debug = false
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use slipform_core::error::SlipformError;
use slipform_translate::TranslateOptions;
use tracing::debug;

use crate::error_bridges::config_error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlipformConfig {
    pub translate: TranslateOptions,
}

/// Flags that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub namespace: Option<String>,
    pub debug: bool,
}

impl SlipformConfig {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, SlipformError> {
        toml::from_str(text).map_err(config_error)
    }

    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SlipformError> {
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SlipformError::file_not_found(path.display().to_string()),
            _ => SlipformError::from(err),
        })?;
        let config = Self::from_toml(&text).map_err(|err| {
            SlipformError::invalid_args(format!("{}: {}", path.display(), err))
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, SlipformError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Translation options with `overrides` applied.
    pub fn translate_options(&self, overrides: &CliOverrides) -> TranslateOptions {
        let mut options = self.translate.clone();
        if let Some(namespace) = &overrides.namespace {
            options.namespace = namespace.clone();
        }
        if overrides.debug {
            options.debug = true;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = SlipformConfig::from_toml("").unwrap();
        assert_eq!(config, SlipformConfig::default());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = SlipformConfig::from_toml("[translate]\nnamespace = \"pf\"\n").unwrap();
        assert_eq!(config.translate.namespace, "pf");
        assert_eq!(config.translate.announce_method, "set_name");
    }

    #[test]
    fn overrides_win() {
        let config = SlipformConfig::from_toml("[translate]\nnamespace = \"pf\"\n").unwrap();
        let options = config.translate_options(&CliOverrides {
            namespace: Some("g".to_string()),
            debug: true,
        });
        assert_eq!(options.namespace, "g");
        assert!(options.debug);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let err = SlipformConfig::from_toml("[render]\nindent = 2\n").unwrap_err();
        assert!(matches!(err, SlipformError::InvalidArguments { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = SlipformConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SlipformError::FileNotFound { .. }));
    }
}
