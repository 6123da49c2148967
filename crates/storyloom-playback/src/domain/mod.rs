//! Playback domain: the session aggregate and the values it exposes.

pub mod actions;
pub mod error;
pub mod events;
pub mod history;
pub mod projection;
pub mod schedule;
pub mod session;
