//! Scheduling policy: auto mode, skip mode and wait timers.
//!
//! The session never runs timers itself. It describes the single timer it
//! wants through `pending_timer()`, and the host calls back with the token
//! once the delay has elapsed. Any state change invalidates outstanding
//! tokens, so a timer that fires late is ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How playback advances through text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Only explicit actions advance.
    #[default]
    Manual,
    /// Text advances after a reading delay.
    Auto,
    /// Text advances on a short tick until anything but text is reached.
    Skip,
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Ends a `wait` command.
    Wait,
    /// Auto-mode advance.
    Auto,
    /// Skip-mode tick.
    Skip,
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    pub(crate) generation: u64,
    pub kind: TimerKind,
}

/// A timer the host should schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub delay: Duration,
}

/// Converts script seconds into a delay. Negative and NaN become zero,
/// values too large for `Duration` saturate.
pub(crate) fn seconds(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_clamps_invalid_values() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
        assert_eq!(seconds(f64::INFINITY), Duration::MAX);
        assert_eq!(seconds(1.5), Duration::from_millis(1500));
    }
}
