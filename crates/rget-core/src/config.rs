use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transport-level settings. Deadlines live here, not in the Stat/Get contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Maximum time to establish a connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional cap on a whole request including the body (None = no cap).
    pub timeout_secs: Option<u64>,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time_secs` (None = off).
    pub low_speed_limit_bytes: Option<u32>,
    pub low_speed_time_secs: u64,
    /// Follow 3xx `Location` redirects.
    pub follow_redirects: bool,
    pub max_redirections: u32,
    pub user_agent: String,
    /// Idle curl handles kept for connection reuse between calls.
    pub max_idle_handles: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: None,
            low_speed_limit_bytes: None,
            low_speed_time_secs: 60,
            follow_redirects: true,
            max_redirections: 10,
            user_agent: concat!("rget/", env!("CARGO_PKG_VERSION")).to_string(),
            max_idle_handles: 8,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

/// Global configuration loaded from `~/.config/rget/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgetConfig {
    #[serde(default)]
    pub transport: TransportConfig,
}

impl RgetConfig {
    /// Render as TOML, in the same shape `load_from` reads.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RgetConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<RgetConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: RgetConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}
