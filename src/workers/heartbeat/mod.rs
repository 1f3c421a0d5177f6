// Package heartbeat provides a ticking background worker watched by the liveness probe.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config;
use crate::liveness;


/// Heartbeat is a worker which beats on a fixed interval until shutdown.
/// It reports itself alive while the latest beat is fresher than `stall_after`.
pub struct Heartbeat {
    shutdown_token: CancellationToken,
    interval: Duration,
    stall_after: Duration,
    last_beat: Mutex<Instant>,
    beats: AtomicU64,
    running: AtomicBool,
}

impl Heartbeat {
    /// Creates a new heartbeat worker, not started yet.
    pub fn new(shutdown_token: CancellationToken, cfg: &config::Heartbeat) -> Arc<Self> {
        Arc::new(Self {
            shutdown_token,
            interval: cfg.interval(),
            stall_after: cfg.stall_after(),
            last_beat: Mutex::new(Instant::now()),
            beats: AtomicU64::new(0),
            running: AtomicBool::new(false),
        })
    }

    /// Beats until the shutdown token is cancelled.
    pub async fn run(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            component = "heartbeat",
            event = "started",
            interval = ?self.interval,
            stall_after = ?self.stall_after,
            "heartbeat worker started"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => self.beat(),
            }
        }

        self.running.store(false, Ordering::SeqCst);

        info!(
            component = "heartbeat",
            event = "stopped",
            beats = self.beats(),
            "heartbeat worker stopped"
        );
    }

    fn beat(&self) {
        *self.last_beat.lock() = Instant::now();
        let beats = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(component = "heartbeat", event = "beat", beats, "beat");
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    pub fn since_last_beat(&self) -> Duration {
        self.last_beat.lock().elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl liveness::Service for Heartbeat {
    async fn is_alive(&self, _deadline: &liveness::Deadline) -> bool {
        if !self.is_running() {
            warn!(
                component = "heartbeat",
                event = "not_running",
                "heartbeat worker is not running"
            );
            return false;
        }

        let since = self.since_last_beat();
        if since >= self.stall_after {
            warn!(
                component = "heartbeat",
                event = "stalled",
                since_last_beat = ?since,
                stall_after = ?self.stall_after,
                "heartbeat worker has stalled"
            );
            return false;
        }
        true
    }
}
