//! The renderer-facing view of a playback session.

use std::fmt;

use serde::{Deserialize, Serialize};
use storyloom_core::script::Presentation;

use super::schedule::PlaybackMode;

/// Which kind of input the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Text,
    Choices,
    Input,
    Wait,
    Video,
    End,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Choices => "choices",
            Self::Input => "input",
            Self::Wait => "wait",
            Self::Video => "video",
            Self::End => "end",
        };
        f.write_str(name)
    }
}

/// Why playback ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndReason {
    /// The cursor ran past the last command.
    Finished,
    /// A jump, condition or choice named a label that does not exist.
    UnresolvedJump { label: String },
    /// Commands kept jumping without ever displaying anything.
    RunawayLoop,
}

impl EndReason {
    /// Returns `true` if the ending was caused by broken content.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Finished)
    }
}

/// A choice as offered to the player.
///
/// Choices whose target does not resolve are never offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Index into the command's full choice list; pass this to
    /// `select_choice`.
    pub index: usize,
    pub label: String,
    pub is_default: bool,
}

/// What to render for the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Display {
    Text {
        speaker: Option<String>,
        text: Option<String>,
    },
    Choices {
        speaker: Option<String>,
        text: Option<String>,
        choices: Vec<ChoiceView>,
    },
    Input {
        speaker: Option<String>,
        text: Option<String>,
        prompt: Option<String>,
        default_value: Option<String>,
    },
    Wait {
        speaker: Option<String>,
        text: Option<String>,
        duration_secs: f64,
    },
    Video {
        path: String,
        skippable: bool,
        looping: bool,
    },
    End {
        reason: EndReason,
        is_error: bool,
    },
}

impl Display {
    /// The state this view renders.
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Text { .. } => StateKind::Text,
            Self::Choices { .. } => StateKind::Choices,
            Self::Input { .. } => StateKind::Input,
            Self::Wait { .. } => StateKind::Wait,
            Self::Video { .. } => StateKind::Video,
            Self::End { .. } => StateKind::End,
        }
    }

    /// The spoken line, for states that show one.
    #[must_use]
    pub fn line(&self) -> Option<(Option<&str>, Option<&str>)> {
        match self {
            Self::Text { speaker, text }
            | Self::Choices { speaker, text, .. }
            | Self::Input { speaker, text, .. }
            | Self::Wait { speaker, text, .. } => Some((speaker.as_deref(), text.as_deref())),
            Self::Video { .. } | Self::End { .. } => None,
        }
    }
}

/// Everything a renderer needs for one frame of playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(flatten)]
    pub display: Display,
    /// Presentation fields of the commands passed through since the last
    /// displayed step, later commands overriding earlier ones.
    #[serde(default, skip_serializing_if = "Presentation::is_empty")]
    pub effects: Presentation,
    pub mode: PlaybackMode,
    pub can_rollback: bool,
    pub is_ended: bool,
    pub history_count: usize,
}
