//! Routes for interactive playtests.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storyloom_core::error::DomainError;
use storyloom_core::script::Script;
use storyloom_core::value::Value;
use storyloom_input::KeyEvent;
use storyloom_playback::{
    BacklogEntry, PlaybackAction, PlaybackError, PlaybackMode, PlaybackSession, Projection,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, HostedSession};
use crate::timers;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub script: Script,
    /// Overrides the server's preferred language for this session.
    #[serde(default)]
    pub language: Option<String>,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub projection: Projection,
}

/// Request body for POST /{id}/choices.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    /// Index into the command's choice list, as given by the projection.
    pub index: usize,
}

/// Request body for POST /{id}/input.
#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub value: String,
}

/// Request body for POST /{id}/rollback.
#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    /// Steps to roll back (default: 1).
    #[serde(default)]
    pub steps: Option<usize>,
}

/// Response body for POST /{id}/rollback.
#[derive(Debug, Serialize)]
pub struct RollbackResponse {
    /// Steps actually rolled back.
    pub rolled_back: usize,
    #[serde(flatten)]
    pub projection: Projection,
}

/// Request body for POST /{id}/jump.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub label: String,
}

/// Request body for POST /{id}/variables.
#[derive(Debug, Deserialize)]
pub struct VariableRequest {
    pub name: String,
    pub value: Value,
}

/// Request body for POST /{id}/mode.
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: PlaybackMode,
}

/// Response body for POST /{id}/keys.
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    /// The action the key was bound to, if any.
    pub action: Option<PlaybackAction>,
    #[serde(flatten)]
    pub projection: Projection,
}

/// Runs `operation` against a locked session, publishes its events and
/// reschedules its timer. Rejected operations leave the timer alone.
async fn apply<T>(
    state: &AppState,
    id: Uuid,
    operation: impl FnOnce(&mut HostedSession) -> Result<T, PlaybackError>,
) -> Result<(T, Projection), ApiError> {
    let handle = state.session(id).await?;
    let mut hosted = handle.lock().await;

    let outcome = operation(&mut *hosted);
    hosted.publish_events();
    let value = outcome?;

    timers::reschedule(&handle, &mut *hosted);
    Ok((value, hosted.session.projection()))
}

/// POST /
#[instrument(skip_all, fields(title = %request.script.title))]
async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<StartResponse>), ApiError> {
    let mut config = state.playback.clone();
    if request.language.is_some() {
        config.language = request.language;
    }

    let session = PlaybackSession::start(Arc::new(request.script), config, Arc::clone(&state.clock));
    let id = session.id();
    let handle = state.insert(HostedSession::new(session)).await?;

    let mut hosted = handle.lock().await;
    hosted.publish_events();
    timers::reschedule(&handle, &mut *hosted);
    info!(session_id = %id, "playtest hosted");

    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            id,
            projection: hosted.session.projection(),
        }),
    ))
}

/// GET /{id}
#[instrument(skip_all, fields(session_id = %id))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, ApiError> {
    let handle = state.session(id).await?;
    let hosted = handle.lock().await;
    Ok(Json(hosted.session.projection()))
}

/// DELETE /{id}
#[instrument(skip_all, fields(session_id = %id))]
async fn stop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let handle = state.remove(id).await?;
    let mut hosted = handle.lock().await;
    hosted.cancel_timer();
    hosted.session.stop();
    hosted.publish_events();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{id}/history
#[instrument(skip_all, fields(session_id = %id))]
async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BacklogEntry>>, ApiError> {
    let handle = state.session(id).await?;
    let hosted = handle.lock().await;
    Ok(Json(hosted.session.backlog()))
}

/// POST /{id}/advance
#[instrument(skip_all, fields(session_id = %id))]
async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| hosted.session.advance()).await?;
    Ok(Json(projection))
}

/// POST /{id}/choices
#[instrument(skip_all, fields(session_id = %id, index = request.index))]
async fn select_choice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| {
        hosted.session.select_choice(request.index)
    })
    .await?;
    Ok(Json(projection))
}

/// POST /{id}/input
#[instrument(skip_all, fields(session_id = %id))]
async fn submit_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InputRequest>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| {
        hosted.session.submit_input(request.value)
    })
    .await?;
    Ok(Json(projection))
}

/// POST /{id}/skip
#[instrument(skip_all, fields(session_id = %id))]
async fn skip_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| hosted.session.skip_media()).await?;
    Ok(Json(projection))
}

/// POST /{id}/video-complete
#[instrument(skip_all, fields(session_id = %id))]
async fn complete_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| hosted.session.complete_video()).await?;
    Ok(Json(projection))
}

/// POST /{id}/rollback
#[instrument(skip_all, fields(session_id = %id))]
async fn rollback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<RollbackRequest>>,
) -> Result<Json<RollbackResponse>, ApiError> {
    let steps = request.and_then(|Json(body)| body.steps).unwrap_or(1);
    let (rolled_back, projection) = apply(&state, id, |hosted| {
        hosted.session.rollback_steps(steps)
    })
    .await?;
    Ok(Json(RollbackResponse {
        rolled_back,
        projection,
    }))
}

/// POST /{id}/restart
#[instrument(skip_all, fields(session_id = %id))]
async fn restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| {
        hosted.session.restart();
        Ok(())
    })
    .await?;
    Ok(Json(projection))
}

/// POST /{id}/jump
#[instrument(skip_all, fields(session_id = %id, label = %request.label))]
async fn jump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JumpRequest>,
) -> Result<Json<Projection>, ApiError> {
    let ((), projection) = apply(&state, id, |hosted| {
        hosted.session.jump_to_label(&request.label)
    })
    .await?;
    Ok(Json(projection))
}

/// POST /{id}/variables
#[instrument(skip_all, fields(session_id = %id, name = %request.name))]
async fn set_variable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VariableRequest>,
) -> Result<Json<Projection>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(DomainError::Validation("variable name must not be empty".to_owned()).into());
    }
    let ((), projection) = apply(&state, id, |hosted| {
        hosted.session.set_variable(request.name, request.value)
    })
    .await?;
    Ok(Json(projection))
}

/// POST /{id}/mode
#[instrument(skip_all, fields(session_id = %id, mode = ?request.mode))]
async fn set_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<Projection>, ApiError> {
    let (_, projection) = apply(&state, id, |hosted| Ok(hosted.session.set_mode(request.mode))).await?;
    Ok(Json(projection))
}

/// POST /{id}/keys
#[instrument(skip_all, fields(session_id = %id, key = %event.key))]
async fn press_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<KeyEvent>,
) -> Result<Json<KeyResponse>, ApiError> {
    let (action, projection) = apply(&state, id, |hosted| {
        let action = hosted.bindings.lookup(&event);
        if let Some(action) = action {
            hosted.session.dispatch(action)?;
        }
        Ok(action)
    })
    .await?;
    Ok(Json(KeyResponse { action, projection }))
}

/// Returns the router for playtests.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start))
        .route("/{id}", get(show).delete(stop))
        .route("/{id}/history", get(history))
        .route("/{id}/advance", post(advance))
        .route("/{id}/choices", post(select_choice))
        .route("/{id}/input", post(submit_input))
        .route("/{id}/skip", post(skip_media))
        .route("/{id}/video-complete", post(complete_video))
        .route("/{id}/rollback", post(rollback))
        .route("/{id}/restart", post(restart))
        .route("/{id}/jump", post(jump))
        .route("/{id}/variables", post(set_variable))
        .route("/{id}/mode", post(set_mode))
        .route("/{id}/keys", post(press_key))
}
