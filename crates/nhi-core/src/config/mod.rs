//! Configuration loading and validation for nhi-core.
//!
//! This module handles:
//! - Loading model.json
//! - Config resolution order (CLI > env > XDG > defaults)
//! - Schema validation (shape/type checking via serde)
//! - Semantic validation (cycle geometry, curve parameters)
//! - Config snapshot generation for command output

pub use nhi_config::validate::ValidationError;
pub use nhi_config::{ConfigPaths, ConfigSnapshot, ConfigSource, ModelConfig};

use nhi_config::snapshot::hash_content;
use nhi_config::{resolve_config, validate_model, CONFIG_SCHEMA_VERSION};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl From<ConfigError> for nhi_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::IoError { source, .. } => nhi_common::Error::Io(source),
            ConfigError::ParseError { .. } => nhi_common::Error::SchemaValidation(err.to_string()),
            ConfigError::ValidationError(_) => nhi_common::Error::InvalidModel(err.to_string()),
            ConfigError::NotFound { .. } | ConfigError::VersionMismatch { .. } => {
                nhi_common::Error::Config(err.to_string())
            }
        }
    }
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The loaded model configuration.
    pub model: ModelConfig,
    /// Where the model came from.
    pub paths: ConfigPaths,
    /// Raw file content (None if using defaults).
    pub content: Option<String>,
}

impl ResolvedConfig {
    /// Built-in defaults with no file behind them.
    pub fn defaults() -> Self {
        ResolvedConfig {
            model: ModelConfig::default(),
            paths: ConfigPaths::default(),
            content: None,
        }
    }

    /// SHA-256 hash of the model file content (None if using defaults).
    pub fn model_hash(&self) -> Option<String> {
        self.content.as_deref().map(hash_content)
    }

    /// Whether no model file was found.
    pub fn using_defaults(&self) -> bool {
        self.paths.model.is_none()
    }

    /// Create a config snapshot for command output.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(&self.model, &self.paths, self.content.as_deref())
    }
}

/// Configuration resolution options.
#[derive(Debug, Default)]
pub struct ConfigOptions {
    /// Explicit config directory (looked up as `<dir>/model.json`).
    pub config_dir: Option<PathBuf>,
    /// Explicit model file path (highest priority).
    pub model_path: Option<PathBuf>,
}

/// Load configuration with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit CLI flags (via ConfigOptions)
/// 2. Environment variables (NHI_MODEL, NHI_CONFIG_DIR)
/// 3. XDG config home (~/.config/nhi/model.json), then /etc/nhi/model.json
/// 4. Built-in defaults
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let paths = resolve_config(options.model_path.as_deref(), options.config_dir.as_deref());

    let Some(path) = paths.model.clone() else {
        return Ok(ResolvedConfig::defaults());
    };

    let (model, content) = load_model_from_file(&path)?;
    validate_model(&model)?;

    Ok(ResolvedConfig {
        model,
        paths,
        content: Some(content),
    })
}

/// Load a model from a specific file, checking its schema version.
pub fn load_model_from_file(path: &Path) -> Result<(ModelConfig, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let model: ModelConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    if model.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(ConfigError::VersionMismatch {
            expected: CONFIG_SCHEMA_VERSION.to_string(),
            actual: model.schema_version.clone(),
        });
    }

    Ok((model, content))
}
