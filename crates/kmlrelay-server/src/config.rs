use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::Deserialize;

use kmlrelay_core::relay::DEFAULT_USER_AGENT;

pub const DEFAULT_CONFIG_PATH: &str = "kmlrelay.toml";

/// Host configuration, read from `kmlrelay.toml` when present. Every field
/// has a default, so the relay starts with no file at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub listen: SocketAddr,
    pub user_agent: String,
    /// Host-level bound on one upstream fetch, in seconds. Unset leaves a
    /// hung upstream to block its single request indefinitely.
    pub upstream_timeout_secs: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8010)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout_secs: None,
            log_level: LogLevel::Info,
        }
    }
}

impl RelayConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    /// A file that exists but does not parse is a startup error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::load_from_str(&contents)
    }

    pub fn load_from_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("invalid relay configuration")
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

/// Log verbosity, mirrored to `log::LevelFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
