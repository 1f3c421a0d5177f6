// HTTP server implementation for the application.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::http::{Controller, Server as HttpServerTrait};
use crate::liveness;

/// Http is the application view on its server: run it and tell whether it still runs.
#[async_trait::async_trait]
pub trait Http: Send + Sync {
    async fn listen_and_serve(&self) -> Result<()>;
    fn is_alive(&self) -> bool;
}

/// HTTP server implementation that wraps all dependencies.
pub struct HttpServer {
    server: Arc<dyn HttpServerTrait>,
    is_server_alive: Arc<AtomicBool>,
}

impl HttpServer {
    /// Creates a new HttpServer with the probe endpoints.
    pub fn new(
        ctx: CancellationToken,
        cfg: Config,
        probe: Arc<dyn liveness::Prober>,
    ) -> Result<Self> {
        let server = crate::http::HttpServer::new(ctx, cfg, Self::controllers(probe))?;

        Ok(Self {
            server,
            is_server_alive: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns all HTTP controllers for the server.
    fn controllers(probe: Arc<dyn liveness::Prober>) -> Vec<Box<dyn Controller>> {
        use crate::controller;

        vec![
            // Healthcheck probe endpoints
            Box::new(controller::LivenessProbeController::new(probe)),
        ]
    }
}

#[async_trait::async_trait]
impl Http for HttpServer {
    /// Starts the HTTP server (blocking call).
    async fn listen_and_serve(&self) -> Result<()> {
        self.is_server_alive.store(true, Ordering::Relaxed);
        let result = self.server.listen_and_serve().await;
        self.is_server_alive.store(false, Ordering::Relaxed);
        result
    }

    /// Returns true if the server is marked as alive.
    fn is_alive(&self) -> bool {
        self.is_server_alive.load(Ordering::Relaxed)
    }
}
