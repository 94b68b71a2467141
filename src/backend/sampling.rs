use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::buffer::ReservoirBuffer;
use crate::component::{Backend, Component};
use crate::config::ReservoirConfig;
use crate::model::{Event, Metric};

/// Forwards events untouched and reservoir-samples metrics.
///
/// Every `window` metrics the reservoir is drained, in timestamp order, into
/// the inner backend. `flush` and `end_of_service` drain early.
#[derive(Debug)]
pub struct SamplingBackend<B, R = StdRng> {
    inner: B,
    reservoir: ReservoirBuffer<Metric, R>,
    window: usize,
    seen: usize,
}

impl<B: Backend> SamplingBackend<B, StdRng> {
    pub fn new(inner: B, capacity: usize, window: usize) -> Self {
        Self::with_rng(inner, capacity, window, StdRng::from_entropy())
    }

    pub fn from_config(inner: B, config: &ReservoirConfig) -> Self {
        Self::new(inner, config.capacity, config.window)
    }
}

impl<B: Backend, R: Rng + Send> SamplingBackend<B, R> {
    pub fn with_rng(inner: B, capacity: usize, window: usize, rng: R) -> Self {
        Self {
            inner,
            reservoir: ReservoirBuffer::with_rng(capacity, rng),
            window: window.max(1),
            seen: 0,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Metrics currently held back.
    pub fn pending(&self) -> usize {
        self.reservoir.len()
    }

    fn drain(&mut self) {
        let sampled = self.reservoir.retrieve_in_order();
        debug!(
            target: "playback_telemetry::backend",
            seen = self.seen,
            kept = sampled.len(),
            "reservoir drained"
        );
        self.seen = 0;
        for metric in sampled {
            self.inner.send_metric(metric);
        }
    }
}

impl<B: Backend, R: Rng + Send> Component for SamplingBackend<B, R> {
    fn instrument_ready(&mut self, instrument_id: &str) {
        self.inner.instrument_ready(instrument_id);
    }

    fn end_of_service(&mut self) {
        self.drain();
        self.inner.end_of_service();
    }
}

impl<B: Backend, R: Rng + Send> Backend for SamplingBackend<B, R> {
    fn send_event(&mut self, event: Event) {
        self.inner.send_event(event);
    }

    fn send_metric(&mut self, metric: Metric) {
        self.reservoir.put(metric);
        self.seen += 1;
        if self.seen >= self.window {
            self.drain();
        }
    }

    fn flush(&mut self) {
        self.drain();
        self.inner.flush();
    }
}
