//! The scenario script: an ordered list of sparse commands.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::localized::LocalizedString;
use crate::value::Value;

/// One step of a scenario.
///
/// A command is a bag of independent optional fields rather than one kind of
/// step: a single command may show text, change the background and set a
/// variable at the same time. Control flow is decided by `jump`, `if` and
/// `choices`, in that order of precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Names this position as a jump target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Who is speaking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<LocalizedString>,
    /// The line shown to the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<LocalizedString>,
    /// Options offered to the player. Each names a target label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// Unconditional transfer to a label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump: Option<String>,
    /// Conditional transfer to a label.
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Variable assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<SetVariable>,
    /// Seconds to pause before continuing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    /// Free-text entry stored into a variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputRequest>,
    /// Video that must finish (or be skipped) before continuing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRequest>,
    /// Side-channel presentation data with no control-flow effect.
    #[serde(flatten)]
    pub presentation: Presentation,
}

impl Command {
    /// Returns `true` if the command shows a line (text or a speaker).
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text.is_some() || self.speaker.is_some()
    }

    /// Returns the choices that govern control flow.
    ///
    /// `jump` takes precedence over `choices`, so a command carrying both
    /// has no primary choices.
    #[must_use]
    pub fn primary_choices(&self) -> Option<&[Choice]> {
        if self.jump.is_some() {
            return None;
        }
        self.choices.as_deref()
    }

    /// Returns `true` if playback stops on this command and waits for the
    /// player or a timer. A holding `if` can still lift the stop on a
    /// command whose only reason to suspend is its choices.
    #[must_use]
    pub fn is_suspending(&self) -> bool {
        self.has_text()
            || self.primary_choices().is_some()
            || self.input.is_some()
            || self.video.is_some()
            || self.wait.is_some()
    }

    /// Returns every label this command refers to, in field order:
    /// `jump`, then `if`, then each choice.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceKind, &str)> {
        let jump = self
            .jump
            .as_deref()
            .map(|label| (ReferenceKind::Jump, label));
        let condition = self
            .condition
            .as_ref()
            .map(|c| (ReferenceKind::Condition, c.jump.as_str()));
        let choices = self
            .choices
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, choice)| (ReferenceKind::Choice(index), choice.jump.as_str()));
        jump.into_iter().chain(condition).chain(choices)
    }
}

/// Where a label reference comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ReferenceKind {
    /// A `jump` field.
    Jump,
    /// The target of an `if` field.
    Condition,
    /// The choice at this index.
    Choice(usize),
}

/// One option of a choice command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown for the option.
    pub label: LocalizedString,
    /// Target label.
    pub jump: String,
    /// Marks the option pre-selected by the renderer.
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// Conditional transfer: taken when `var` currently equals `is`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Variable to test.
    pub var: String,
    /// Value the variable must equal.
    pub is: Value,
    /// Target label when the condition holds.
    pub jump: String,
}

/// Assignment of a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    /// Variable name.
    pub name: String,
    /// New value.
    pub value: Value,
}

/// Free-text entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRequest {
    /// Variable that receives the entered text.
    pub var: String,
    /// Prompt shown above the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<LocalizedString>,
    /// Pre-filled text.
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A video step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Asset path, passed through to the renderer.
    pub path: String,
    /// Whether the player may skip the video.
    #[serde(default = "default_skippable")]
    pub skippable: bool,
    /// A looping video never ends on its own.
    #[serde(rename = "loop", default)]
    pub looping: bool,
}

fn default_skippable() -> bool {
    true
}

/// Presentational side-channel fields.
///
/// The core never interprets these values; they reach the renderer exactly
/// as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shake: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<serde_json::Value>,
}

impl Presentation {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays every field set in `later` onto `self`.
    pub fn merge(&mut self, later: &Self) {
        fn overlay(slot: &mut Option<serde_json::Value>, value: Option<&serde_json::Value>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
        overlay(&mut self.background, later.background.as_ref());
        overlay(&mut self.character, later.character.as_ref());
        overlay(&mut self.audio, later.audio.as_ref());
        overlay(&mut self.camera, later.camera.as_ref());
        overlay(&mut self.transition, later.transition.as_ref());
        overlay(&mut self.particles, later.particles.as_ref());
        overlay(&mut self.shake, later.shake.as_ref());
        overlay(&mut self.achievements, later.achievements.as_ref());
    }
}

/// A complete scenario.
///
/// Treated as immutable by the analyzer and by playback; an edit produces a
/// new `Script`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Scenario title.
    #[serde(default)]
    pub title: String,
    /// Commands in execution order.
    #[serde(rename = "script", default)]
    pub commands: Vec<Command>,
}

impl Script {
    /// Creates a script from a title and commands.
    #[must_use]
    pub fn new(title: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            title: title.into(),
            commands,
        }
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the script has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the command at `position`, if in range.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Command> {
        self.commands.get(position)
    }

    /// Hex SHA-256 of the script's JSON encoding.
    ///
    /// Identifies the revision an analysis report or playtest was produced
    /// from.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        // Serialization of derived Serialize types to a Vec is infallible.
        let bytes = serde_json::to_vec(self).expect("Script serialization is infallible");
        format!("{:x}", Sha256::digest(&bytes))
    }
}
