// Package liveness provides the Prober trait for liveness checking.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Error, Outcome, Service};

/// Prober can handle services/applications.
///
/// Typical usage registers the targets before they start working:
/// ```no_run
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use liveprobe::liveness::{Probe, Prober, Service};
/// # async fn run(useful: Arc<dyn Service>) -> Result<(), liveprobe::liveness::Error> {
/// let probe = Arc::new(Probe::new(Duration::from_secs(5))) as Arc<dyn Prober>;
/// probe.watch(vec![useful])?;
/// let _is_alive = probe.is_alive().await;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// Starts the responder for the given targets. Must be called once,
    /// before the first query and before the targets start their work.
    fn watch(&self, services: Vec<Arc<dyn Service>>) -> Result<(), Error>;

    /// Asks the responder and reports how the round trip ended.
    async fn check(&self) -> Outcome;

    /// Checks whether every watched service is alive within the probe timeout.
    async fn is_alive(&self) -> bool {
        self.check().await.is_alive()
    }
}
