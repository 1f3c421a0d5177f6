// Service trait for liveness checking

use async_trait::async_trait;

use super::Deadline;

/// Service interface for liveness checking.
///
/// Implementations must return promptly once `deadline` expires and must not
/// panic: internal failures are reported as `false`.
#[async_trait]
pub trait Service: Send + Sync {
    /// Checks if the service is alive
    async fn is_alive(&self, deadline: &Deadline) -> bool;
}
