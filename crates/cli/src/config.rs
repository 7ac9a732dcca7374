// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.rep/config.toml` and includes:
//! - `client_id`: identity this device presents to the remote
//! - `[remote]`: optional WebSocket endpoint and reconnection settings
//! - `[session]`: optional execution settings (proof media ceiling)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use rp_core::lifecycle::DEFAULT_PROOF_MAX_BYTES;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::ConnectionConfig;

const WORK_DIR_NAME: &str = ".rep";
const CONFIG_FILE_NAME: &str = "config.toml";
const GITIGNORE_FILE_NAME: &str = ".gitignore";
const LOG_FILE_NAME: &str = "rep.log";

/// Project configuration stored in `.rep/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Client identity used in the remote handshake.
    pub client_id: String,
    /// Remote sync configuration. Without it every action stays queued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote Data Service endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    pub url: String,
    /// Connection attempts per backoff round (default: 10, 0 = unlimited).
    #[serde(default = "default_reconnect_max_retries")]
    pub reconnect_max_retries: u32,
    /// Maximum delay between reconnection attempts in seconds (default: 30).
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
    /// First backoff delay in milliseconds (default: 100).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Max time to wait for one connection attempt in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Session execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Largest proof image accepted, in bytes (default: 10 MiB).
    #[serde(default = "default_proof_max_bytes")]
    pub proof_max_bytes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            proof_max_bytes: default_proof_max_bytes(),
        }
    }
}

fn default_reconnect_max_retries() -> u32 {
    10
}

fn default_reconnect_max_delay_secs() -> u64 {
    30
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_proof_max_bytes() -> u64 {
    DEFAULT_PROOF_MAX_BYTES
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            reconnect_max_retries: default_reconnect_max_retries(),
            reconnect_max_delay_secs: default_reconnect_max_delay_secs(),
            initial_delay_ms: default_initial_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Returns an error message if the URL is not a WebSocket URL.
    pub fn validate_url(&self) -> Option<String> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            return None;
        }
        Some(format!(
            "invalid remote URL '{}': must start with ws:// or wss://",
            self.url
        ))
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            max_retries: self.reconnect_max_retries,
            max_delay_secs: self.reconnect_max_delay_secs,
            initial_delay_ms: self.initial_delay_ms,
        }
    }
}

impl Config {
    /// Creates a config with a freshly generated client id.
    pub fn new() -> Self {
        Self::with_client_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_client_id(client_id: impl Into<String>) -> Self {
        Config {
            client_id: client_id.into(),
            remote: None,
            session: SessionConfig::default(),
        }
    }

    /// Loads configuration from the given `.rep/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if config.client_id.trim().is_empty() {
            return Err(Error::Config("client_id cannot be empty".to_string()));
        }
        if let Some(reason) = config.remote.as_ref().and_then(RemoteConfig::validate_url) {
            return Err(Error::Config(reason));
        }
        Ok(config)
    }

    /// Saves configuration to the given `.rep/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// The remote endpoint, with `REP_REMOTE_URL` taking precedence.
    pub fn effective_remote(&self) -> Option<RemoteConfig> {
        match (env::remote_url(), &self.remote) {
            (Some(url), Some(remote)) => Some(RemoteConfig {
                url,
                ..remote.clone()
            }),
            (Some(url), None) => Some(RemoteConfig::new(url)),
            (None, remote) => remote.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the .rep directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Directory holding the queue files and session cache.
///
/// `REP_STATE_DIR` overrides the default of the work directory itself.
pub fn state_dir(work_dir: &Path) -> PathBuf {
    env::state_dir().unwrap_or_else(|| work_dir.to_path_buf())
}

pub fn log_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOG_FILE_NAME)
}

/// Initialize a new .rep directory at the given path
pub fn init_work_dir(path: &Path, remote: Option<&str>) -> Result<(PathBuf, Config)> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let mut config = Config::new();
    if let Some(url) = remote {
        let remote = RemoteConfig::new(url);
        if let Some(reason) = remote.validate_url() {
            return Err(Error::Config(reason));
        }
        config.remote = Some(remote);
    }

    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok((work_dir, config))
}

/// Write a .gitignore file to the work directory.
///
/// Everything under `.rep/` is device-local state.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = "# Device-local state: pending sync queue, session cache, logs\n*\n";
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
