//! Abstract actions that input layers send to a session.

use serde::{Deserialize, Serialize};

/// An action token, independent of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "ordinal", rename_all = "snake_case")]
pub enum PlaybackAction {
    Advance,
    Rollback,
    ToggleAuto,
    ToggleSkip,
    /// Skips the current wait or video.
    SkipMedia,
    Restart,
    /// Picks the n-th *displayed* choice, counting from zero.
    SelectChoice(usize),
}
