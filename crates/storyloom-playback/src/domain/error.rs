//! Rejected playback actions.

use storyloom_core::error::DomainError;
use thiserror::Error;

use super::projection::StateKind;

/// An action that is not legal for the session's current state.
///
/// Rejections never change the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("cannot {action} while in {state} state")]
    IllegalAction {
        action: &'static str,
        state: StateKind,
    },

    #[error("playback has ended; restart to play again")]
    SessionEnded,

    #[error("nothing to roll back")]
    NothingToRollback,

    #[error("choice {index} is out of range ({count} choices)")]
    ChoiceOutOfRange { index: usize, count: usize },

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("this video cannot be skipped")]
    NotSkippable,

    #[error("a looping video never ends on its own; skip it instead")]
    LoopingVideo,
}

impl From<PlaybackError> for DomainError {
    fn from(err: PlaybackError) -> Self {
        Self::Rejected(err.to_string())
    }
}
