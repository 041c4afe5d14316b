//! TOML-based configuration for the svntopo CLI.
//!
//! Everything has a sensible default, so a config file is optional; command
//! line flags override whatever the file provides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

/// Application configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default path for the history dump when the CLI gets no positional
    /// input argument.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Where to write the directive stream; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            input: None,
            output: None,
        }
    }
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "log_level".into(),
                detail: format!("'{}' is not a tracing level", other),
            }),
        }
    }
}
