//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Malformed script content is never reported through this type; it surfaces
/// as analyzer issues, unresolved lookups or an ended playback.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No playtest session exists with the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The requested action is not legal in the current playback state.
    #[error("action rejected: {0}")]
    Rejected(String),

    /// A malformed request (not malformed script content).
    #[error("validation error: {0}")]
    Validation(String),
}
