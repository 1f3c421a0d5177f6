// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::liveness;

pub const PROD: &str = "prod";
pub const TEST: &str = "test";

const DEFAULT_BEAT_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_STALL_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveProbe {
    #[serde(rename = "liveprobe")]
    pub liveprobe: LiveProbeBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveProbeBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub api: Option<Api>,
    pub k8s: Option<K8S>,
    pub heartbeat: Option<Heartbeat>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Api {
    pub name: Option<String>,
    pub port: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct K8S {
    #[serde(default)]
    pub probe: liveness::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Heartbeat {
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    #[serde(rename = "stall_after", default, with = "humantime_serde")]
    pub stall_after: Option<Duration>,
}

impl Heartbeat {
    pub fn interval(&self) -> Duration {
        self.interval.unwrap_or(DEFAULT_BEAT_INTERVAL)
    }

    pub fn stall_after(&self) -> Duration {
        self.stall_after.unwrap_or(DEFAULT_STALL_AFTER)
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: Some(DEFAULT_BEAT_INTERVAL),
            stall_after: Some(DEFAULT_STALL_AFTER),
        }
    }
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn api(&self) -> Option<&Api>;
    fn k8s(&self) -> Option<&K8S>;
    fn probe(&self) -> liveness::Config;
    fn heartbeat(&self) -> Heartbeat;
}

// Config type alias for convenience
pub type Config = LiveProbe;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.liveprobe.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.liveprobe.env == PROD
    }

    fn api(&self) -> Option<&Api> {
        self.liveprobe.api.as_ref()
    }

    fn k8s(&self) -> Option<&K8S> {
        self.liveprobe.k8s.as_ref()
    }

    fn probe(&self) -> liveness::Config {
        self.k8s().map(|k8s| k8s.probe.clone()).unwrap_or_default()
    }

    fn heartbeat(&self) -> Heartbeat {
        self.liveprobe.heartbeat.clone().unwrap_or_default()
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::parse(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))
    }

    /// Parses and validates a YAML document.
    pub fn parse(data: &str) -> Result<Self> {
        let cfg: LiveProbe = serde_yaml::from_str(data)?;

        let heartbeat = cfg.heartbeat();
        if heartbeat.interval().is_zero() {
            anyhow::bail!("heartbeat.interval must be positive");
        }
        if heartbeat.stall_after() <= heartbeat.interval() {
            anyhow::bail!(
                "heartbeat.stall_after ({:?}) must exceed heartbeat.interval ({:?})",
                heartbeat.stall_after(),
                heartbeat.interval()
            );
        }

        Ok(cfg)
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
