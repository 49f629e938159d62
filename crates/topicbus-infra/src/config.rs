//! Bus configuration loader.
//!
//! Reads `topicbus.toml` from a configuration directory and deserializes it
//! into [`BusConfig`]. The lenient loader falls back to defaults when the
//! file is missing or malformed; the strict loader reports why.

use std::path::{Path, PathBuf};

use topicbus_types::config::BusConfig;
use topicbus_types::error::ConfigError;

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "topicbus.toml";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "TOPICBUS_CONFIG_DIR";

/// Resolve the configuration directory.
///
/// Priority:
/// 1. `TOPICBUS_CONFIG_DIR` environment variable
/// 2. Platform config directory (e.g. `~/.config/topicbus` on Linux)
/// 3. The current directory
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(config) = dirs::config_dir() {
        return config.join("topicbus");
    }

    PathBuf::from(".")
}

/// Load configuration from `{config_dir}/topicbus.toml`.
///
/// - Missing file: returns [`BusConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_bus_config(config_dir: &Path) -> BusConfig {
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    match try_load_bus_config(&config_path).await {
        Ok(config) => config,
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE_NAME} found at {}, using defaults", config_path.display());
            BusConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            BusConfig::default()
        }
    }
}

/// Load configuration from an explicit file path.
///
/// # Errors
///
/// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
/// if it is not a valid configuration.
pub async fn try_load_bus_config(path: &Path) -> Result<BusConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str::<BusConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })
}
