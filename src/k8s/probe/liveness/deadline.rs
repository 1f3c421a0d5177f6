// Deadline context handed to watched services.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

// About 30 years, used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Cancellation signal carrying an absolute expiry time.
///
/// One deadline is created per liveness query. It expires either when its
/// instant passes or when the asking side gives up (whichever comes first),
/// so services may rely on [`Deadline::cancelled`] to bound their work.
#[derive(Debug, Clone)]
pub struct Deadline {
    token: CancellationToken,
    expires_at: Instant,
}

impl Deadline {
    /// Creates a deadline which expires `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            token: CancellationToken::new(),
            expires_at: now.checked_add(timeout).unwrap_or(now + FAR_FUTURE),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        if self.token.is_cancelled() {
            return Duration::ZERO;
        }
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.expires_at
    }

    /// Expires the deadline right away.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Completes once the deadline has expired.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = sleep_until(self.expires_at) => {}
        }
    }

    /// Runs `fut` until it completes or the deadline expires.
    /// Returns `None` when the deadline won.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }

    /// Cancels the deadline when the returned guard is dropped.
    pub(crate) fn guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
