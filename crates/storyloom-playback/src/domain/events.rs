//! Domain events for playback sessions.

use serde::{Deserialize, Serialize};
use storyloom_core::event::{DomainEvent, EventMetadata};
use storyloom_core::value::Value;

use super::projection::EndReason;
use super::schedule::PlaybackMode;

/// Emitted when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Started {
    /// Title of the script being played.
    pub title: String,
    /// Number of commands in the script.
    pub command_count: usize,
}

/// Emitted when the player moves past a text step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advanced {
    /// Position that was departed.
    pub from: usize,
}

/// Emitted when the player picks a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSelected {
    /// Position of the choice command.
    pub from: usize,
    /// Index of the chosen option.
    pub index: usize,
    /// Target label of the option.
    pub target: String,
}

/// Emitted when the player submits free-text input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSubmitted {
    /// Variable that received the input.
    pub var: String,
    /// The submitted text.
    pub value: String,
}

/// Emitted when a wait or video finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFinished {
    /// Position of the wait or video command.
    pub from: usize,
    /// Whether the player skipped it.
    pub skipped: bool,
}

/// Emitted on rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledBack {
    /// Number of history entries removed.
    pub steps: usize,
    /// Position restored.
    pub to: usize,
}

/// Emitted on a debug jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jumped {
    /// The label jumped to.
    pub label: String,
}

/// Emitted on a debug variable assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSet {
    /// Variable name.
    pub name: String,
    /// New value.
    pub value: Value,
}

/// Emitted when the playback mode changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeChanged {
    /// The new mode.
    pub mode: PlaybackMode,
}

/// Emitted when playback reaches its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ended {
    /// Why it ended.
    pub reason: EndReason,
}

/// Event payload variants for playback sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    Started(Started),
    Advanced(Advanced),
    ChoiceSelected(ChoiceSelected),
    InputSubmitted(InputSubmitted),
    MediaFinished(MediaFinished),
    RolledBack(RolledBack),
    Restarted,
    Jumped(Jumped),
    VariableSet(VariableSet),
    ModeChanged(ModeChanged),
    Ended(Ended),
    Stopped,
}

impl PlaybackEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started(_) => "playback.started",
            Self::Advanced(_) => "playback.advanced",
            Self::ChoiceSelected(_) => "playback.choice_selected",
            Self::InputSubmitted(_) => "playback.input_submitted",
            Self::MediaFinished(_) => "playback.media_finished",
            Self::RolledBack(_) => "playback.rolled_back",
            Self::Restarted => "playback.restarted",
            Self::Jumped(_) => "playback.jumped",
            Self::VariableSet(_) => "playback.variable_set",
            Self::ModeChanged(_) => "playback.mode_changed",
            Self::Ended(_) => "playback.ended",
            Self::Stopped => "playback.stopped",
        }
    }
}

/// Domain event envelope for playback sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("PlaybackEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
