//! Timer tasks for hosted sessions.
//!
//! Each session has at most one task, sleeping until the session's pending
//! timer is due. Whatever changes a session must call [`reschedule`] while
//! still holding its lock, which replaces the task.

use std::sync::Arc;

use tracing::debug;

use crate::state::{HostedSession, SessionHandle};

/// Replaces the session's timer task with one for its current
/// `pending_timer()`, or with none.
pub fn reschedule(handle: &SessionHandle, hosted: &mut HostedSession) {
    hosted.cancel_timer();
    let Some(request) = hosted.session.pending_timer() else {
        return;
    };

    let session_id = hosted.session.id();
    debug!(%session_id, kind = ?request.token.kind, delay_ms = request.delay.as_millis(), "timer scheduled");

    // The task holds a weak handle so a stopped session is freed even while
    // a sleep is outstanding.
    let weak = Arc::downgrade(handle);
    hosted.timer = Some(tokio::spawn(async move {
        tokio::time::sleep(request.delay).await;
        let Some(handle) = weak.upgrade() else {
            return;
        };
        let mut hosted = handle.lock().await;
        if !hosted.session.fire_timer(request.token) {
            // The session changed while we slept; whoever changed it has
            // already scheduled its replacement.
            return;
        }
        hosted.publish_events();
        // This task is finishing: detach its own handle rather than abort it.
        hosted.timer = None;
        reschedule(&handle, &mut *hosted);
    }));
}
