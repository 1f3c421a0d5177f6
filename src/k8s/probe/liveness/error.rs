// Error definitions for liveness probe

/// Errors reported by the liveness probe setup path.
///
/// Queries never fail: every problem met while answering one collapses into
/// a non-alive [`super::Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("liveness probe timeout is too short")]
    TimeoutIsTooShort,
    #[error("liveness probe timeout is too long")]
    TimeoutIsTooLong,
    #[error("liveness probe is already watching its targets")]
    AlreadyWatching,
}
