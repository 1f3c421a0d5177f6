// Main entrypoint for the LiveProbe service.

use anyhow::{Context, Result};
use clap::Parser;
use liveprobe::app::App;
use liveprobe::config::{Config, ConfigTrait};
use liveprobe::liveness;
use liveprobe::shutdown::GracefulShutdown;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const CONFIG_PATH: &str = "cfg/liveprobe.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/liveprobe.cfg.local.yaml";

/// LiveProbe - a worker service exposing a bounded liveness probe
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok((cfg, PathBuf::from(CONFIG_PATH_LOCAL))),
        Err(_) => {
            let cfg = Config::load(CONFIG_PATH)
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, PathBuf::from(CONFIG_PATH)))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let shutdown_token = CancellationToken::new();

    // Logger depends on the config, so config errors go to stderr via anyhow.
    let (cfg, cfg_path) = load_cfg(args.cfg)?;
    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        path = ?cfg_path,
        "config loaded"
    );

    let graceful_shutdown =
        Arc::new(GracefulShutdown::new(shutdown_token.clone()).with_timeout(Duration::from_secs(60)));

    // Created before the watched work starts.
    let probe = Arc::new(liveness::Probe::from_config(&cfg.probe())) as Arc<dyn liveness::Prober>;

    let app = App::new(shutdown_token.clone(), cfg, probe)?;
    if let Err(e) = app.serve(graceful_shutdown.clone()).await {
        error!(
            component = "main",
            scope = "app",
            event = "start_failed",
            error = %e,
            "failed to start app"
        );
        return Err(e);
    }

    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
