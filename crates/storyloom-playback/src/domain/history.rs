//! Recorded playback history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyloom_core::script::Presentation;
use storyloom_core::value::Variables;

use super::projection::Display;

/// One displayed step the player has moved past.
///
/// Holds everything needed to return to that step exactly, including the
/// variables as they were while it was shown.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HistoryEntry {
    pub position: usize,
    pub variables: Variables,
    pub effects: Presentation,
    pub display: Display,
    pub recorded_at: DateTime<Utc>,
}

/// A line in the backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklogEntry {
    pub speaker: Option<String>,
    pub text: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub(crate) fn backlog_entry(&self) -> Option<BacklogEntry> {
        let (speaker, text) = self.display.line()?;
        if speaker.is_none() && text.is_none() {
            return None;
        }
        Some(BacklogEntry {
            speaker: speaker.map(str::to_owned),
            text: text.map(str::to_owned),
            recorded_at: self.recorded_at,
        })
    }
}
