// HTTP API controllers.

pub mod controller;
pub mod probe;


// Re-export controller types for convenience
pub use probe::LivenessProbeController;
