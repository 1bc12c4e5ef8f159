//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to model.json (or None if not found).
    pub model: Option<PathBuf>,

    /// Source of the model config (for diagnostics).
    pub model_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/nhi/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_MODEL_PATH: &str = "NHI_MODEL";
pub const ENV_CONFIG_DIR: &str = "NHI_CONFIG_DIR";

/// Standard config file name.
pub const MODEL_FILENAME: &str = "model.json";

/// Application name for XDG directories.
const APP_NAME: &str = "nhi";

/// Resolve the model configuration path.
///
/// Resolution order:
/// 1. Explicit CLI file path (returned even if missing, so loading reports it)
/// 2. Explicit CLI config directory + model.json
/// 3. `NHI_MODEL` environment variable
/// 4. `NHI_CONFIG_DIR` environment variable + model.json
/// 5. XDG config directory (~/.config/nhi/)
/// 6. System config (/etc/nhi/)
/// 7. Built-in defaults (None)
pub fn resolve_config(cli_model: Option<&Path>, cli_dir: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();

    // 1. CLI file
    if let Some(path) = cli_model {
        paths.model = Some(path.to_path_buf());
        paths.model_source = ConfigSource::CliArgument;
        return paths;
    }

    // 2. CLI directory
    if let Some(dir) = cli_dir {
        let path = dir.join(MODEL_FILENAME);
        if path.exists() {
            paths.model = Some(path);
            paths.model_source = ConfigSource::CliArgument;
            return paths;
        }
    }

    // 3. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_MODEL_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            paths.model = Some(path);
            paths.model_source = ConfigSource::Environment;
            return paths;
        }
    }

    // 4. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(MODEL_FILENAME);
        if path.exists() {
            paths.model = Some(path);
            paths.model_source = ConfigSource::Environment;
            return paths;
        }
    }

    // 5. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(MODEL_FILENAME);
        if path.exists() {
            paths.model = Some(path);
            paths.model_source = ConfigSource::XdgConfig;
            return paths;
        }
    }

    // 6. System config
    let system_path = system_config_dir().join(MODEL_FILENAME);
    if system_path.exists() {
        paths.model = Some(system_path);
        paths.model_source = ConfigSource::SystemConfig;
        return paths;
    }

    paths
}

/// Get the XDG config directory for the toolkit.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_returned_even_if_missing() {
        let path = Path::new("/nonexistent/model.json");
        let paths = resolve_config(Some(path), None);
        assert_eq!(paths.model.as_deref(), Some(path));
        assert_eq!(paths.model_source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_cli_dir_without_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let paths = resolve_config(None, Some(dir.path()));
        assert_ne!(paths.model_source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_cli_dir_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(MODEL_FILENAME);
        std::fs::write(&file, r#"{"schema_version":"1.0.0"}"#).unwrap();
        let paths = resolve_config(None, Some(dir.path()));
        assert_eq!(paths.model, Some(file));
        assert_eq!(paths.model_source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/nhi"));
    }
}
