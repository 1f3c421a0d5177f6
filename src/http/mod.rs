// HTTP module: server and controller wiring.

pub mod server;

// Re-export server types
pub use server::{HttpServer, Server};

// Common controller interface
pub use crate::controller::controller::Controller;
