// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! error_marker = "~"
//! hierarchy_separator = "."
//! ```

use crate::hierarchy::ErrorHierarchy;
use crate::transition::{DEFAULT_ERROR_MARKER, DEFAULT_HIERARCHY_SEPARATOR};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("error marker and hierarchy separator must differ (both {0:?})")]
    MarkerIsSeparator(char),
}

/// Naming rules the engine applies to error transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Character that begins an error transition name
    pub error_marker: char,
    /// Separator between levels of an error transition name
    pub hierarchy_separator: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_marker: DEFAULT_ERROR_MARKER,
            hierarchy_separator: DEFAULT_HIERARCHY_SEPARATOR,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.error_marker == self.hierarchy_separator {
            return Err(ConfigError::MarkerIsSeparator(self.error_marker));
        }
        Ok(())
    }

    pub fn hierarchy(&self) -> ErrorHierarchy {
        ErrorHierarchy::new(self.error_marker, self.hierarchy_separator)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
