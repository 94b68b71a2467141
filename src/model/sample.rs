use std::time::{SystemTime, UNIX_EPOCH};

/// Anything carrying a capture timestamp.
///
/// Timestamps are milliseconds since the Unix epoch. They are set once at
/// construction; `set_timestamp` exists for replay and tests.
pub trait Sample {
    fn timestamp(&self) -> u64;
    fn set_timestamp(&mut self, timestamp: u64);
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
