// Package liveness provides configuration for liveness probes.
//

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_QUEUE: usize = 64;

/// Configuration for liveness probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Timeout duration as a string (e.g., "5s", "10ms").
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Capacity of the pending queries queue.
    #[serde(default = "default_queue")]
    pub queue: usize,
}

fn default_timeout() -> String {
    "5s".to_string()
}

fn default_queue() -> usize {
    DEFAULT_QUEUE
}

impl Config {
    /// Creates a new config with default timeout.
    pub fn new() -> Self {
        Self {
            timeout: default_timeout(),
            queue: default_queue(),
        }
    }

    /// Parses and returns the liveness timeout duration.
    pub fn liveness_timeout(&self) -> Duration {
        humantime::parse_duration(&self.timeout).unwrap_or_else(|err| {
            warn!(
                component = "liveness",
                event = "bad_timeout",
                error = %err,
                timeout = %self.timeout,
                "Failed to parse liveness probe timeout, using default: 5s"
            );
            DEFAULT_TIMEOUT
        })
    }

    /// Returns the pending queries capacity, never less than one.
    pub fn queue_capacity(&self) -> usize {
        self.queue.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
