//! Clock abstraction for deterministic event and history timestamps.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time.
///
/// Playback stamps history entries and events through this trait so tests can
/// pin time with a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
