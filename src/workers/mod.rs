// Background workers watched by the liveness probe.

pub mod heartbeat;

pub use heartbeat::Heartbeat;
