use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::state::DEFAULT_PROJECT;

/// Environment variable that overrides `[api].base_url`.
pub const API_URL_ENV: &str = "AIDE_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_project")]
    pub project: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
        }
    }
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadsConfig {
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Defaults used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Apply the environment override for the base URL. Empty values are ignored.
    pub fn with_env_override(mut self, env_value: Option<String>) -> Self {
        if let Some(url) = env_value.filter(|v| !v.trim().is_empty()) {
            self.api.base_url = Some(url);
        }
        self
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, fall back to defaults otherwise, then apply
/// `AIDE_API_URL`.
pub fn load_or_default(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        load_config(path)?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Config::minimal()
    };
    let config = config.with_env_override(std::env::var(API_URL_ENV).ok());
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.session.project.trim().is_empty() {
        anyhow::bail!("session.project must not be empty");
    }

    if let Some(url) = config.api.base_url.as_deref() {
        let url = url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "api.base_url must start with http:// or https://, got '{}'",
                url
            );
        }
    }

    Ok(())
}
