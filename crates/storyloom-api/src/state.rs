//! Shared application state: the registry of hosted playtests.

use std::collections::HashMap;
use std::sync::Arc;

use storyloom_core::clock::Clock;
use storyloom_core::error::DomainError;
use storyloom_core::event::DomainEvent;
use storyloom_input::BindingTable;
use storyloom_playback::{PlaybackConfig, PlaybackSession};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::config::ServerConfig;

/// A playtest session together with what the host keeps alongside it.
#[derive(Debug)]
pub struct HostedSession {
    pub session: PlaybackSession,
    pub bindings: BindingTable,
    pub(crate) timer: Option<JoinHandle<()>>,
}

impl HostedSession {
    /// Hosts `session` with the default key bindings.
    #[must_use]
    pub fn new(session: PlaybackSession) -> Self {
        Self {
            session,
            bindings: BindingTable::default_table(),
            timer: None,
        }
    }

    /// Drains the session's events into the log.
    pub fn publish_events(&mut self) {
        for event in self.session.take_events() {
            let meta = event.metadata();
            info!(
                session_id = %meta.session_id,
                event_type = event.event_type(),
                sequence_number = meta.sequence_number,
                payload = %event.to_payload(),
                "playback event"
            );
        }
    }

    /// Cancels the outstanding timer task, if any.
    pub fn cancel_timer(&mut self) {
        if let Some(task) = self.timer.take() {
            task.abort();
        }
    }
}

/// Handle to one hosted session. Requests on a session are serialized by
/// its mutex.
pub type SessionHandle = Arc<Mutex<HostedSession>>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    /// Defaults for new sessions.
    pub playback: PlaybackConfig,
    /// Maximum number of live sessions.
    pub max_sessions: usize,
    /// Clock injected into every session.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            playback: config.playback.clone(),
            max_sessions: config.max_sessions,
            clock,
        }
    }

    /// Registers a new session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session limit is reached.
    pub async fn insert(&self, hosted: HostedSession) -> Result<SessionHandle, DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(DomainError::Validation(format!(
                "session limit of {} reached; stop a playtest first",
                self.max_sessions
            )));
        }
        let id = hosted.session.id();
        let handle = Arc::new(Mutex::new(hosted));
        sessions.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Looks up a live session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session has this id.
    pub async fn session(&self, id: Uuid) -> Result<SessionHandle, DomainError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(id))
    }

    /// Unregisters a session and returns it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session has this id.
    pub async fn remove(&self, id: Uuid) -> Result<SessionHandle, DomainError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .ok_or(DomainError::SessionNotFound(id))
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
