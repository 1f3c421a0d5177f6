// Package liveness provides Kubernetes liveness probe functionality.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout_at;
use tracing::{debug, info, warn};

pub mod config;
pub mod deadline;
pub mod error;
pub mod outcome;
pub mod prober;
pub mod service;

mod probe_test;

pub use config::Config;
pub use deadline::Deadline;
pub use error::Error;
pub use outcome::Outcome;
pub use prober::Prober;
pub use service::Service;

const MIN_TIMEOUT: Duration = Duration::from_millis(1);
const FALLBACK_TIMEOUT: Duration = Duration::from_millis(10);
const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// One liveness question with its own reply slot.
struct Query {
    deadline: Deadline,
    reply: oneshot::Sender<bool>,
}

/// Liveness probe implementation
pub struct Probe {
    ask_tx: mpsc::Sender<Query>,
    // Taken by the first `watch` call.
    ask_rx: Mutex<Option<mpsc::Receiver<Query>>>,
    timeout: Duration,
}

impl Probe {
    /// Creates a new liveness probe
    pub fn new(timeout_duration: Duration) -> Self {
        Self::with_queue(timeout_duration, config::DEFAULT_QUEUE)
    }

    /// Creates a liveness probe from its config section.
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_queue(cfg.liveness_timeout(), cfg.queue_capacity())
    }

    /// Creates a liveness probe which keeps up to `queue` pending queries.
    pub fn with_queue(timeout_duration: Duration, queue: usize) -> Self {
        let timeout = if timeout_duration < MIN_TIMEOUT {
            warn!(
                component = "liveness",
                event = "timeout_too_short",
                error = %Error::TimeoutIsTooShort,
                "min timeout duration is 1ms (timeout set up as 10ms as a more reasonable value)"
            );
            FALLBACK_TIMEOUT
        } else if timeout_duration > MAX_TIMEOUT {
            warn!(
                component = "liveness",
                event = "timeout_too_long",
                error = %Error::TimeoutIsTooLong,
                requested = ?timeout_duration,
                "max timeout duration is 1h (timeout set up as 1h)"
            );
            MAX_TIMEOUT
        } else {
            timeout_duration
        };

        let (ask_tx, ask_rx) = mpsc::channel::<Query>(queue.max(1));

        Self {
            ask_tx,
            ask_rx: Mutex::new(Some(ask_rx)),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts watching services. This must be called before IsAlive can work properly.
    ///
    /// Spawns the single responder task on the current tokio runtime. The task
    /// ends once the probe is dropped. A watched service holding the probe keeps
    /// both alive, so in a service which watches itself the task lives for the
    /// whole process.
    pub fn watch(&self, services: Vec<Arc<dyn Service>>) -> Result<(), Error> {
        let ask_rx = self.ask_rx.lock().take().ok_or_else(|| {
            warn!(
                component = "liveness",
                event = "watch_rejected",
                "liveness probe is already watching, ignoring second registration"
            );
            Error::AlreadyWatching
        })?;

        info!(
            component = "liveness",
            event = "watch_started",
            targets = services.len(),
            timeout = ?self.timeout,
            "liveness probe is watching"
        );

        tokio::task::spawn(respond(ask_rx, services));
        Ok(())
    }

    /// Asks the responder and reports how the round trip ended.
    /// Always returns within the probe timeout.
    pub async fn check(&self) -> Outcome {
        let deadline = Deadline::after(self.timeout);
        // Expire the deadline for the services once we stop waiting.
        let _guard = deadline.guard();

        let (reply_tx, reply_rx) = oneshot::channel();
        let query = Query {
            deadline: deadline.clone(),
            reply: reply_tx,
        };

        let answer = timeout_at(deadline.expires_at(), async {
            self.ask_tx.send(query).await.ok()?;
            reply_rx.await.ok()
        })
        .await;

        match answer {
            Ok(Some(is_alive)) => Outcome::from(is_alive),
            Ok(None) => {
                warn!(
                    component = "liveness",
                    event = "responder_gone",
                    "liveness responder has gone away"
                );
                Outcome::Unhealthy
            }
            Err(_) => {
                warn!(
                    component = "liveness",
                    event = "deadline_exceeded",
                    timeout = ?self.timeout,
                    "liveness probe deadline exceeded while checking service"
                );
                Outcome::TimedOut
            }
        }
    }

    /// Checks whether every watched service is alive.
    pub async fn is_alive(&self) -> bool {
        self.check().await.is_alive()
    }
}

/// Serves queries one at a time until every sender is dropped.
async fn respond(mut ask_rx: mpsc::Receiver<Query>, services: Vec<Arc<dyn Service>>) {
    while let Some(query) = ask_rx.recv().await {
        if query.reply.is_closed() {
            debug!(
                component = "liveness",
                event = "stale_query_skipped",
                "caller gave up before the query was picked"
            );
            continue;
        }

        // No short-circuit: every service is asked each time.
        let mut is_alive = true;
        for service in &services {
            is_alive &= service.is_alive(&query.deadline).await;
        }

        if query.reply.send(is_alive).is_err() {
            debug!(
                component = "liveness",
                event = "late_answer_dropped",
                is_alive,
                "caller gave up before the answer was ready"
            );
        }
    }

    debug!(
        component = "liveness",
        event = "watch_stopped",
        "liveness responder stopped"
    );
}

#[async_trait]
impl Prober for Probe {
    fn watch(&self, services: Vec<Arc<dyn Service>>) -> Result<(), Error> {
        Probe::watch(self, services)
    }

    async fn check(&self) -> Outcome {
        Probe::check(self).await
    }
}

/// A probe may itself be watched by an outer probe.
#[async_trait]
impl Service for Probe {
    async fn is_alive(&self, deadline: &Deadline) -> bool {
        deadline
            .run(Probe::check(self))
            .await
            .map(Outcome::is_alive)
            .unwrap_or(false)
    }
}
