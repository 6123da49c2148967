//! Storyloom Core — the scenario script model.
//!
//! This crate defines the data both consumers of a script share: the sparse
//! `Command` record, the `Script` value, variable values, localized strings
//! and the label index used to resolve jump targets. It contains no
//! playback or analysis logic.

pub mod clock;
pub mod error;
pub mod event;
pub mod label;
pub mod localized;
pub mod script;
pub mod value;
