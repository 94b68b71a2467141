use serde::{Deserialize, Serialize};

use super::{now_ms, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
}

/// A named numeric observation derived from one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    timestamp: u64,
    name: String,
    #[serde(rename = "type")]
    metric_type: MetricType,
    value: f64,
}

impl Metric {
    pub fn new(name: impl Into<String>, metric_type: MetricType, value: f64) -> Self {
        Self {
            timestamp: now_ms(),
            name: name.into(),
            metric_type,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Time from request (or load) to first frame, in milliseconds.
    pub fn start_time(value: f64) -> Self {
        Self::new("StartTime", MetricType::Gauge, value)
    }

    pub fn num_plays(value: f64) -> Self {
        Self::new("NumPlays", MetricType::Counter, value)
    }

    pub fn rebuffer_time(value: f64) -> Self {
        Self::new("RebufferTime", MetricType::Gauge, value)
    }

    pub fn num_rebuffers(value: f64) -> Self {
        Self::new("NumRebuffers", MetricType::Counter, value)
    }

    /// Play time since the previous accepted event.
    pub fn play_time(value: f64) -> Self {
        Self::new("PlayTime", MetricType::Gauge, value)
    }

    pub fn num_requests(value: f64) -> Self {
        Self::new("NumRequests", MetricType::Counter, value)
    }

    pub fn num_loads(value: f64) -> Self {
        Self::new("NumLoads", MetricType::Counter, value)
    }

    pub fn num_ends(value: f64) -> Self {
        Self::new("NumEnds", MetricType::Counter, value)
    }
}

impl Sample for Metric {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }
}
