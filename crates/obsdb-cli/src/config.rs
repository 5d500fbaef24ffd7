//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::ConfigKey;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SynopticLabs API token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Cache database file
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// SynopticLabs API root
    #[serde(default)]
    pub base_url: Option<String>,

    /// Download timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("obsdb")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Current value of a key, for display. The API key is masked.
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::ApiKey => self.api_key.as_deref().map(mask_secret),
            ConfigKey::Database => self.database.as_ref().map(|p| p.display().to_string()),
            ConfigKey::BaseUrl => self.base_url.clone(),
            ConfigKey::Timeout => self.timeout.map(|t| t.to_string()),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::ApiKey => self.api_key = Some(value.to_string()),
            ConfigKey::Database => self.database = Some(PathBuf::from(value)),
            ConfigKey::BaseUrl => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    bail!("base_url must start with http:// or https://, got: {}", value);
                }
                self.base_url = Some(value.to_string());
            }
            ConfigKey::Timeout => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
                if secs == 0 {
                    bail!("timeout must be at least 1 second");
                }
                self.timeout = Some(secs);
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiKey => self.api_key = None,
            ConfigKey::Database => self.database = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::Timeout => self.timeout = None,
        }
    }
}

/// Show the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if shown.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{}****", shown)
    }
}
