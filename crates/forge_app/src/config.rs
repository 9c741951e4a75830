//! Client configuration: defaults, then `luna.ron`, then environment, then flags.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use forge_engine::{derive_ws_url, BackendSettings, ChannelSettings, EngineSettings};
use forge_logging::{forge_info, LogDestination};
use log::LevelFilter;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "luna.ron";

const ENV_BACKEND_URL: &str = "LUNA_BACKEND_URL";
const ENV_WS_URL: &str = "LUNA_WS_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub backend_url: String,
    /// Derived from `backend_url` when unset.
    pub ws_url: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub completion_delay_ms: u64,
    /// `0` disables the stall watchdog.
    pub stall_timeout_secs: u64,
    pub log_destination: String,
    pub log_level: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            ws_url: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            completion_delay_ms: 1500,
            stall_timeout_secs: 600,
            log_destination: "file".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ForgeConfig {
    /// Reads `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let config: Self =
            ron::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
        forge_info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(url) = lookup(ENV_WS_URL).filter(|v| !v.trim().is_empty()) {
            self.ws_url = Some(url);
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn channel_settings(&self) -> anyhow::Result<ChannelSettings> {
        let ws_base_url = match &self.ws_url {
            Some(url) => url.clone(),
            None => derive_ws_url(&self.backend_url)?,
        };
        Ok(ChannelSettings {
            ws_base_url,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            completion_delay: Duration::from_millis(self.completion_delay_ms),
            stall_timeout: (self.stall_timeout_secs > 0)
                .then(|| Duration::from_secs(self.stall_timeout_secs)),
            ..EngineSettings::default()
        }
    }

    pub fn log_destination(&self) -> anyhow::Result<LogDestination> {
        LogDestination::parse(&self.log_destination)
            .ok_or_else(|| anyhow!("unknown log destination {:?}", self.log_destination))
    }

    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))
    }
}
