//! TOML-based configuration for quiver.
//!
//! Supports a config file (quiver.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [transport]
//! host = "${FLIGHT_HOST}"
//! port = 5005
//! timeout_secs = 30
//!
//! [store]
//! name = "fs_featurestore"
//! id = 67
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Flight transport configuration.
    pub transport: TransportSettings,

    /// Feature store identity.
    pub store: StoreSettings,
}

/// Flight transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Flight server host (supports ${ENV_VAR} expansion).
    pub host: String,

    /// Flight server port.
    pub port: u16,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5005,
            timeout_secs: 30,
        }
    }
}

impl TransportSettings {
    /// The `host:port` address the client connects to.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the host with environment variables expanded.
    pub fn resolved_host(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.host)
    }
}

/// Feature store identity.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreSettings {
    /// Feature store name (supports ${ENV_VAR} expansion).
    pub name: Option<String>,

    /// Feature store id.
    pub id: Option<i32>,
}

impl StoreSettings {
    /// Get the store name with environment variables expanded.
    pub fn resolved_name(&self) -> Result<Option<String>, SettingsError> {
        self.name.as_deref().map(expand_env_vars).transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUIVER_CONFIG`
    /// 2. `./quiver.toml`
    /// 3. `~/.config/quiver/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("QUIVER_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("quiver.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quiver").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&ch) = chars.peek() {
            let take = if braced {
                ch != '}'
            } else {
                ch.is_alphanumeric() || ch == '_'
            };
            if !take {
                break;
            }
            name.push(ch);
            chars.next();
        }
        if braced {
            // Consume the closing '}'
            chars.next();
        }
        if !braced && name.is_empty() {
            // A lone dollar sign stays as-is
            result.push('$');
            continue;
        }
        let value = env::var(&name).map_err(|_| SettingsError::MissingEnvVar(name))?;
        result.push_str(&value);
    }

    Ok(result)
}
