//! Configuration management for the bulkdl CLI
//!
//! Resolution order: built-in defaults, then a TOML file (`./bulkdl.toml`, or
//! `<config dir>/bulkdl/config.toml`), then `BULKDL_*` environment variables.

use crate::api::client::{DEFAULT_API_TIMEOUT_SECS, DEFAULT_GRAPHQL_PATH, DEFAULT_SERVER_URL};
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "bulkdl.toml";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform base URL
    pub server_url: String,

    /// Path of the federated GraphQL endpoint
    pub graphql_path: String,

    /// Authenticity (CSRF) token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// ID of the signed-in user, used for ownership checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<u64>,

    /// Admins bypass uploader and collaborator restrictions
    pub is_admin: bool,

    /// Upper bound on objects for original input file downloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_samples_original_files: Option<usize>,

    /// Directory CSV downloads are written to
    pub output_dir: PathBuf,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            graphql_path: DEFAULT_GRAPHQL_PATH.to_string(),
            auth_token: None,
            current_user_id: None,
            is_admin: false,
            max_samples_original_files: None,
            output_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load defaults, then the config file if present, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.merge_env()
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Cannot read config file '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Defaults overridden by the environment only
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Apply `BULKDL_*` environment overrides
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("BULKDL_SERVER_URL") {
            self.server_url = url;
        }

        if let Ok(path) = std::env::var("BULKDL_GRAPHQL_PATH") {
            self.graphql_path = path;
        }

        if let Ok(token) = std::env::var("BULKDL_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }

        if let Ok(user) = std::env::var("BULKDL_USER_ID") {
            let id = user
                .parse()
                .map_err(|_| CliError::config(format!("BULKDL_USER_ID must be a number, got '{}'", user)))?;
            self.current_user_id = Some(id);
        }

        if let Ok(dir) = std::env::var("BULKDL_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("BULKDL_API_TIMEOUT_SECS") {
            self.timeout_secs = secs.parse().map_err(|_| {
                CliError::config(format!("BULKDL_API_TIMEOUT_SECS must be a number, got '{}'", secs))
            })?;
        }

        Ok(self)
    }

    /// Copy safe to print: the auth token is masked.
    pub fn redacted(&self) -> Self {
        Self {
            auth_token: self.auth_token.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::config(e.to_string()))
    }
}

/// `./bulkdl.toml` when present, otherwise the per-user config file.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|dir| dir.join("bulkdl").join("config.toml"))
}
