#[path = "k8s/probe/liveness/mod.rs"]
pub mod liveness;
#[cfg(test)]
mod tests;

pub mod app;
pub mod config;
pub mod controller;
pub mod http;
pub mod shutdown;
pub mod workers;
