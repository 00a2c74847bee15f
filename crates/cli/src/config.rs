use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable that overrides the configured server URL.
pub const SERVER_URL_ENV: &str = "PITCHSENSE_SERVER_URL";

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the pitchsense server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// State file holding theme and history (default: <config dir>/state.json)
    #[serde(default)]
    pub state_file: Option<String>,
}

fn default_server_url() -> String {
    "http://localhost:3001".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            state_file: None,
        }
    }
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/pitchsense/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("pitchsense");
        Ok(config_dir)
    }

    /// Return the default config file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// Writes and returns the default config if the file does not exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(?config_path, "Loading config");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config: {}", config_path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
            Ok(config)
        } else {
            debug!(?config_path, "Config file not found, using defaults");
            let config = Self::default();
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let toml_str = toml::to_string_pretty(&config)
                .context("failed to serialize default config")?;
            std::fs::write(&config_path, toml_str).ok();
            Ok(config)
        }
    }

    /// Resolve the server URL.
    /// Priority: cli_override > env var > config file.
    pub fn resolve_server_url(&self, cli_override: Option<&str>) -> String {
        if let Some(url) = cli_override {
            return url.to_string();
        }
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) if !url.is_empty() => url,
            _ => self.server_url.clone(),
        }
    }

    /// Resolve the state file path.
    /// Priority: cli_override > config file > default location.
    pub fn resolve_state_path(&self, cli_override: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = cli_override.or(self.state_file.as_deref()) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::default_config_dir()?.join("state.json"))
    }
}
