// Package api provides liveness probe controller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::http::Controller;
use crate::liveness::{self, Outcome};

pub const K8S_PROBE_PATH: &str = "/k8s/probe";
pub const HEALTHZ_PATH: &str = "/healthz";

const SUCCESS_MESSAGE: &str = "I'm fine :D";
const FAILED_MESSAGE: &str = "I'm tired :(";

#[derive(Debug, Serialize)]
struct ProbeResponse {
    status: u16,
    outcome: Outcome,
    message: &'static str,
}

/// LivenessProbeController handles Kubernetes liveness probes.
pub struct LivenessProbeController {
    probe: Arc<dyn liveness::Prober>,
}

impl LivenessProbeController {
    /// Creates a new liveness probe controller.
    pub fn new(probe: Arc<dyn liveness::Prober>) -> Self {
        Self { probe }
    }

    /// Handles the probe request.
    async fn probe(probe: Arc<dyn liveness::Prober>) -> Response {
        let outcome = probe.check().await;
        let (status, message) = if outcome.is_alive() {
            (StatusCode::OK, SUCCESS_MESSAGE)
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, FAILED_MESSAGE)
        };

        let body = ProbeResponse {
            status: status.as_u16(),
            outcome,
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl Controller for LivenessProbeController {
    fn add_route(&self, router: Router) -> Router {
        let k8s_probe = self.probe.clone();
        let healthz_probe = self.probe.clone();
        router
            .route(
                K8S_PROBE_PATH,
                get(move || {
                    let probe = k8s_probe.clone();
                    async move { Self::probe(probe).await }
                }),
            )
            .route(
                HEALTHZ_PATH,
                get(move || {
                    let probe = healthz_probe.clone();
                    async move { Self::probe(probe).await }
                }),
            )
    }
}

impl Clone for LivenessProbeController {
    fn clone(&self) -> Self {
        Self {
            probe: self.probe.clone(),
        }
    }
}
