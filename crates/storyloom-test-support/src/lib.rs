//! Shared test clocks and script fixtures for the Storyloom engine.

mod clock;
pub mod fixtures;

pub use clock::FixedClock;
