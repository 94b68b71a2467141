//! # Backends
//!
//! ## Responsibility
//! Terminal sinks of the pipeline. Each receives the metrics derived from an
//! event and then the event itself.
//!
//! | Backend | Sink |
//! |---|---|
//! | [`MemoryBackend`] | shared in-process record, for tests and embedding |
//! | [`LogBackend`] | structured `tracing` records |
//! | [`JsonLinesBackend`] | one JSON object per line on any `Write` |
//! | [`SamplingBackend`] | reservoir-samples metrics before an inner backend |
//!
//! ## NOT Responsible For
//! - Retrying failed deliveries. A write error is logged and counted.

mod jsonlines;
mod log;
mod memory;
mod sampling;

pub use jsonlines::JsonLinesBackend;
pub use log::LogBackend;
pub use memory::{Lifecycle, MemoryBackend};
pub use sampling::SamplingBackend;
