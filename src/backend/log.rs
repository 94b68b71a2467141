use tracing::{info, warn};

use crate::component::{Backend, Component};
use crate::model::{Event, Metric, Sample};

/// Writes every event and metric as an `info` record under the
/// `playback_telemetry::backend` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBackend;

impl LogBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Component for LogBackend {
    fn instrument_ready(&mut self, instrument_id: &str) {
        info!(target: "playback_telemetry::backend", instrument = instrument_id, "log backend ready");
    }

    fn end_of_service(&mut self) {
        info!(target: "playback_telemetry::backend", "log backend ended");
    }
}

impl Backend for LogBackend {
    fn send_event(&mut self, event: Event) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(
                target: "playback_telemetry::backend",
                action = %event.action(),
                timestamp = event.timestamp(),
                attributes = event.len(),
                %json,
                "event"
            ),
            Err(e) => warn!(target: "playback_telemetry::backend", action = %event.action(), error = %e, "event not serializable"),
        }
    }

    fn send_metric(&mut self, metric: Metric) {
        info!(
            target: "playback_telemetry::backend",
            name = metric.name(),
            kind = ?metric.metric_type(),
            value = metric.value(),
            timestamp = metric.timestamp(),
            "metric"
        );
    }
}
