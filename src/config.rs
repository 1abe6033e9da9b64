use anyhow::{Context, bail};
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub server: ServerConfig,
    pub storage: Database,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let cfg: Config = toml::from_str(contents).with_context(|| "Failed to parse config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version != 1 {
            bail!("unsupported config version {}", self.version);
        }
        if let Some(rate) = self
            .playback
            .rate_options
            .iter()
            .find(|rate| !(rate.is_finite() && **rate > 0.0))
        {
            bail!("playback.rate_options contains invalid rate {rate}");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// path and query of the page the player runs on, used as the login return target
    #[serde(default = "default_page")]
    pub page: String,
    /// raw `Cookie` header value carrying the service session
    pub session_cookie: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_page() -> String {
    "/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Where the durable local storage (playback rate preference) lives
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Database {
    InMemory,
    OnDisk { path: PathBuf },
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    #[serde(default = "default_rate_options")]
    pub rate_options: Vec<f64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rate_options: default_rate_options(),
        }
    }
}

pub fn default_rate_options() -> Vec<f64> {
    vec![0.75, 1.0, 1.25, 1.5, 1.75, 2.0]
}
