//! Storyloom — interactive playtest of a script.
//!
//! A [`PlaybackSession`] walks a script the way a reader experiences it:
//! text, choices, free-text input, waits and videos, with variables,
//! history, rollback and auto/skip modes. The session is a pure state
//! machine; hosts drive its timers through [`PlaybackSession::pending_timer`]
//! and [`PlaybackSession::fire_timer`].

pub mod config;
pub mod domain;

pub use config::PlaybackConfig;
pub use domain::actions::PlaybackAction;
pub use domain::error::PlaybackError;
pub use domain::events::{PlaybackEvent, PlaybackEventKind};
pub use domain::history::BacklogEntry;
pub use domain::projection::{ChoiceView, Display, EndReason, Projection, StateKind};
pub use domain::schedule::{PlaybackMode, TimerKind, TimerRequest, TimerToken};
pub use domain::session::PlaybackSession;
