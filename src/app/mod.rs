// Application wiring: the watched service, its HTTP server and the probe.

pub mod app;
pub mod server;

pub use app::App;
pub use server::{Http, HttpServer};
