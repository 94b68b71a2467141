use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::component::{Backend, Component};
use crate::model::{Action, Event, Metric};

/// Lifecycle calls a [`MemoryBackend`] has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Ready(String),
    Flush,
    EndOfService,
}

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<Event>,
    metrics: Vec<Metric>,
    lifecycle: Vec<Lifecycle>,
}

/// Records everything it receives. Clones share the same record, so keep a
/// clone to inspect what the instrument delivered.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    recorded: Arc<Mutex<Recorded>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.lock().metrics.clone()
    }

    pub fn lifecycle(&self) -> Vec<Lifecycle> {
        self.lock().lifecycle.clone()
    }

    /// Actions of the recorded events, in delivery order.
    pub fn actions(&self) -> Vec<Action> {
        self.lock().events.iter().map(|e| e.action().clone()).collect()
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.lock().metrics.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn last_event(&self) -> Option<Event> {
        self.lock().events.last().cloned()
    }

    pub fn clear(&self) {
        let mut recorded = self.lock();
        recorded.events.clear();
        recorded.metrics.clear();
        recorded.lifecycle.clear();
    }
}

impl Component for MemoryBackend {
    fn instrument_ready(&mut self, instrument_id: &str) {
        self.lock().lifecycle.push(Lifecycle::Ready(instrument_id.to_string()));
    }

    fn end_of_service(&mut self) {
        self.lock().lifecycle.push(Lifecycle::EndOfService);
    }
}

impl Backend for MemoryBackend {
    fn send_event(&mut self, event: Event) {
        self.lock().events.push(event);
    }

    fn send_metric(&mut self, metric: Metric) {
        self.lock().metrics.push(metric);
    }

    fn flush(&mut self) {
        self.lock().lifecycle.push(Lifecycle::Flush);
    }
}
