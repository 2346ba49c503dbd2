use crate::api::constants;
use crate::api::{ClientBuilder, FlashArrayClient, TransportConfig};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_TARGET: &str = "FLASHARRAY_TARGET";
pub const ENV_ACCESS_TOKEN: &str = "FLASHARRAY_ACCESS_TOKEN";
pub const ENV_API_VERSION: &str = "FLASHARRAY_API_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "FLASHARRAY_TIMEOUT_SECS";
pub const ENV_RETRIES: &str = "FLASHARRAY_RETRIES";

/// Connection settings persisted in `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Array management address
    pub target: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Retry budget per call; absent means unlimited
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    /// Extra PEM root certificate to trust
    #[serde(default)]
    pub ssl_cert: Option<PathBuf>,
}

fn default_api_version() -> String {
    constants::DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    constants::DEFAULT_USER_AGENT.to_string()
}

fn default_verify_ssl() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: None,
            api_version: default_api_version(),
            access_token: None,
            timeout: default_timeout(),
            retries: None,
            user_agent: default_user_agent(),
            verify_ssl: default_verify_ssl(),
            ssl_cert: None,
        }
    }
}

impl ClientConfig {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("flasharray-client");
        Ok(config_dir.join("config.toml"))
    }

    /// Load the default config file (if any), then apply `.env` and environment overrides
    pub fn load() -> Result<Self> {
        Self::load_with(&Self::get_config_path()?)
    }

    /// Load `path` (if it exists), then apply `.env` and environment overrides
    pub fn load_with(path: &Path) -> Result<Self> {
        if let Ok(env_path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", env_path);
        }

        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            info!("Config file {:?} doesn't exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).with_context(|| format!("Failed to create config directory: {:?}", dir))?;
                info!("Created config directory: {:?}", dir);
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))?;

        info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Apply `FLASHARRAY_*` overrides looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(target) = lookup(ENV_TARGET) {
            self.target = Some(target);
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            self.api_version = version;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, timeout))?;
        }
        if let Some(retries) = lookup(ENV_RETRIES) {
            self.retries = parse_retries(&retries)
                .with_context(|| format!("{} must be a number or 'unlimited', got '{}'", ENV_RETRIES, retries))?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            user_agent: self.user_agent.clone(),
            verify_ssl: self.verify_ssl,
            ssl_cert: self.ssl_cert.clone(),
            ..TransportConfig::default()
        }
    }

    /// Client builder preloaded with these settings
    pub fn client_builder(&self) -> ClientBuilder {
        let mut builder = FlashArrayClient::builder()
            .api_version(self.api_version.clone())
            .timeout(self.request_timeout())
            .transport_config(self.transport_config())
            .max_retries(self.retries);

        if let Some(target) = &self.target {
            builder = builder.target(target.clone());
        }
        if let Some(token) = &self.access_token {
            builder = builder.access_token(token.clone());
        }
        builder
    }

    pub fn build_client(&self) -> Result<FlashArrayClient> {
        self.client_builder()
            .build()
            .context("Failed to create FlashArray client from configuration")
    }
}

fn parse_retries(value: &str) -> Result<Option<u32>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("unlimited") {
        return Ok(None);
    }
    Ok(Some(value.parse()?))
}
