use std::io::{self, Write};

use serde::Serialize;
use tracing::warn;

use crate::component::{Backend, Component};
use crate::error::{Result, TelemetryError};
use crate::model::{Event, Metric};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Record<'a> {
    Event(&'a Event),
    Metric(&'a Metric),
}

/// Writes `{"kind":"event",...}` and `{"kind":"metric",...}` lines.
///
/// Write failures are logged and counted; the pipeline never sees them.
#[derive(Debug)]
pub struct JsonLinesBackend<W: Write + Send> {
    writer: W,
    lines: u64,
    failures: u64,
}

impl JsonLinesBackend<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesBackend<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines: 0,
            failures: 0,
        }
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &Record<'_>) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.writer, "{line}").map_err(TelemetryError::Write)?;
        Ok(())
    }

    fn deliver(&mut self, record: Record<'_>) {
        match self.write_record(&record) {
            Ok(()) => self.lines += 1,
            Err(e) => {
                self.failures += 1;
                warn!(target: "playback_telemetry::backend", error = %e, "json line dropped");
            }
        }
    }
}

impl<W: Write + Send> Component for JsonLinesBackend<W> {
    fn end_of_service(&mut self) {
        Backend::flush(self);
    }
}

impl<W: Write + Send> Backend for JsonLinesBackend<W> {
    fn send_event(&mut self, event: Event) {
        self.deliver(Record::Event(&event));
    }

    fn send_metric(&mut self, metric: Metric) {
        self.deliver(Record::Metric(&metric));
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(target: "playback_telemetry::backend", error = %e, "flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Attribute};
    use serde_json::Value;

    fn parse(bytes: &[u8]) -> Vec<Value> {
        std::str::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_event_line_shape() {
        let mut backend = JsonLinesBackend::new(Vec::new());
        let mut event = Event::new(Action::START);
        event.set(Attribute::COUNT_STARTS, 1u64);
        backend.send_event(event);
        let lines = parse(backend.get_ref());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["kind"], "event");
        assert_eq!(lines[0]["action"], "Start");
        assert_eq!(lines[0]["attributes"]["countStarts"], 1);
    }

    #[test]
    fn test_metric_line_shape() {
        let mut backend = JsonLinesBackend::new(Vec::new());
        backend.send_metric(Metric::rebuffer_time(1500.0));
        let lines = parse(&backend.into_inner());
        assert_eq!(lines[0]["kind"], "metric");
        assert_eq!(lines[0]["name"], "RebufferTime");
        assert_eq!(lines[0]["type"], "gauge");
        assert_eq!(lines[0]["value"], 1500.0);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_counted() {
        let mut backend = JsonLinesBackend::new(Broken);
        backend.send_event(Event::new(Action::PING));
        assert_eq!(backend.failures(), 1);
        assert_eq!(backend.lines(), 0);
    }
}
