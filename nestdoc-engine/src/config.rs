//! Engine configuration, read from `nestdoc.toml`.

use crate::{EngineError, EngineResult};
use nestdoc_query::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// How resource paths in links are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Prefix for every link, e.g. `/api/v1`. Empty by default.
    pub base_path: String,
}

impl LinkConfig {
    /// The resource path for `path`, below the base path.
    pub fn resource(&self, path: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        if base.is_empty() {
            path.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Top-level engine configuration.
///
/// ```toml
/// [compiler]
/// alias_strategy = "depth"
///
/// [links]
/// base_path = "/api/v1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub compiler: CompilerConfig,
    pub links: LinkConfig,
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file
    /// is an error.
    pub fn load_from(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml(&contents)?;
        info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Like [`load_from`](Self::load_from), but falls back to the defaults
    /// with a warning instead of failing.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }
}
