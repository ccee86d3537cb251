//! Configuration management for qbridge.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QBRIDGE_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::executor::ConversionScheme;
use crate::graph::GraphOptions;
use crate::search::DEFAULT_PATH_BIAS;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Graph construction settings
    #[serde(default)]
    pub graph: GraphConfig,

    /// Fallback execution settings
    #[serde(default)]
    pub conversion: ConversionScheme,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Graph construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Per-edge bias added to every declared weight
    #[serde(default = "default_bias")]
    pub bias: f64,

    /// Keep restricted nodes that have no edges
    #[serde(default)]
    pub include_isolated: bool,

    /// Drop non-native conversions
    #[serde(default)]
    pub native_only: bool,

    /// Restrict the graph to these nodes
    #[serde(default)]
    pub nodes: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bias() -> f64 {
    DEFAULT_PATH_BIAS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            bias: default_bias(),
            include_isolated: false,
            native_only: false,
            nodes: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Default location of the configuration file, `~/.qbridge/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qbridge").join("config.yaml"))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: Config =
            serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. The given file, or the default path if it exists
    /// 2. Environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Unset or unparsable variables leave the corresponding fields unchanged.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("QBRIDGE_PATH_BIAS").and_then(|v| v.parse().ok()) {
            self.graph.bias = val;
        }
        if let Some(val) = var("QBRIDGE_NATIVE_ONLY").and_then(|v| parse_bool(&v)) {
            self.graph.native_only = val;
        }

        if let Some(val) = var("QBRIDGE_MAX_PATH_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.conversion.max_path_attempts = val;
        }
        if let Some(val) = var("QBRIDGE_MAX_PATH_DEPTH").and_then(|v| v.parse().ok()) {
            self.conversion.max_path_depth = Some(val);
        }

        if let Some(level) = var("QBRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.graph.bias.is_finite() || self.graph.bias < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "graph.bias must be finite and non-negative, got {}",
                self.graph.bias
            )));
        }

        if self.conversion.max_path_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "conversion.max_path_attempts must be greater than 0".to_string(),
            ));
        }

        if let Some(nodes) = &self.graph.nodes {
            if nodes.iter().any(|n| n.trim().is_empty()) {
                return Err(ConfigError::ValidationError(
                    "graph.nodes must not contain empty names".to_string(),
                ));
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Graph build options described by this configuration.
    pub fn graph_options(&self) -> GraphOptions {
        let mut options = GraphOptions::new()
            .include_isolated(self.graph.include_isolated)
            .native_only(self.graph.native_only)
            .with_bias(self.graph.bias);
        if let Some(nodes) = &self.graph.nodes {
            options = options.restrict_to(nodes.iter().cloned());
        }
        options
    }

    /// Fallback execution scheme described by this configuration.
    pub fn scheme(&self) -> ConversionScheme {
        self.conversion.clone()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
