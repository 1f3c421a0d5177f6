use super::{Api, Heartbeat, LiveProbe, LiveProbeBox, Logs, K8S};
use crate::liveness;
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> LiveProbe {
    LiveProbe {
        liveprobe: LiveProbeBox {
            env: super::TEST.to_string(),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            api: Some(Api {
                name: Some("liveprobe:8091".to_string()),
                port: Some("8091".to_string()),
            }),
            k8s: Some(K8S {
                probe: liveness::Config {
                    timeout: "500ms".to_string(),
                    queue: 8,
                },
            }),
            heartbeat: Some(Heartbeat {
                interval: Some(Duration::from_millis(20)),
                stall_after: Some(Duration::from_millis(200)),
            }),
        },
    }
}
