//! Route modules.

pub mod analysis;
pub mod health;
pub mod playtest;
