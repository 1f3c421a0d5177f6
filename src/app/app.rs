// Main application implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigTrait};
use crate::liveness;
use crate::shutdown::GracefulShutdown;
use crate::workers::Heartbeat;

use super::server::{Http, HttpServer};

/// Encapsulates the entire application state.
#[derive(Clone)]
pub struct App {
    cfg: Config,
    shutdown_token: CancellationToken,
    probe: Arc<dyn liveness::Prober>,
    heartbeat: Arc<Heartbeat>,
    server: Arc<dyn Http>,
}

impl App {
    /// Creates a new application instance.
    pub fn new(
        shutdown_token: CancellationToken,
        cfg: Config,
        probe: Arc<dyn liveness::Prober>,
    ) -> Result<Self> {
        let heartbeat = Heartbeat::new(shutdown_token.clone(), &cfg.heartbeat());
        let server = Arc::new(HttpServer::new(
            shutdown_token.clone(),
            cfg.clone(),
            probe.clone(),
        )?);

        Ok(Self {
            cfg,
            shutdown_token,
            probe,
            heartbeat,
            server,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registers the liveness targets, then starts the workers and the server.
    pub async fn serve(&self, gsh: Arc<GracefulShutdown>) -> Result<()> {
        // Register liveness targets before any work starts.
        self.probe
            .watch(vec![
                Arc::new(self.clone()) as Arc<dyn liveness::Service>,
                self.heartbeat.clone() as Arc<dyn liveness::Service>,
            ])
            .context("failed to register liveness targets")?;

        gsh.add(1);
        let heartbeat = self.heartbeat.clone();
        let heartbeat_gsh = gsh.clone();
        tokio::task::spawn(async move {
            heartbeat.run().await;
            heartbeat_gsh.done();
        });

        gsh.add(1);
        let server = self.server.clone();
        let app_for_close = self.clone();
        let server_gsh = gsh.clone();
        tokio::task::spawn(async move {
            if let Err(e) = server.listen_and_serve().await {
                error!(
                    component = "app",
                    scope = "server",
                    event = "serve_failed",
                    error = %e,
                    "server failed to serve"
                );
            }

            app_for_close.close();
            server_gsh.done();
        });

        info!(
            component = "app",
            event = "started",
            "application lifecycle"
        );

        Ok(())
    }

    /// Checks whether the HTTP server is still alive.
    pub fn is_alive(&self) -> bool {
        if !self.server.is_alive() {
            warn!(
                component = "app",
                scope = "http_server",
                event = "gone_away",
                "http server has gone away"
            );
            return false;
        }
        true
    }

    /// Stops everything sharing the shutdown token.
    pub fn close(&self) {
        self.shutdown_token.cancel();

        info!(
            component = "app",
            event = "stopped",
            "application lifecycle"
        );
    }
}

#[async_trait]
impl liveness::Service for App {
    async fn is_alive(&self, _deadline: &liveness::Deadline) -> bool {
        App::is_alive(self)
    }
}
