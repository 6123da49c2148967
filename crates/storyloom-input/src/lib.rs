//! Storyloom — input binding table.
//!
//! Maps raw key events to abstract [`PlaybackAction`]s. Lookup is pure; the
//! caller applies the returned action to a session.
//!
//! [`PlaybackAction`]: storyloom_playback::PlaybackAction

pub mod binding;

pub use binding::{Binding, BindingTable, KeyEvent, Modifiers};
