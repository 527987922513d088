//! Orchestrates play sessions: creation, transitions, and terminal effects.
//!
//! Transitions are applied in memory first and never wait on storage. When a
//! run reaches a terminal phase the outcome is handed to a background task
//! that persists it, notifies the change feed on success, and announces the
//! finish on the realtime stream. A failed write is logged and dropped; it
//! must never revert or stall the session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    dao::models::NewResultRecord,
    dto::{
        game::{AnswerResponse, GameStateResponse, OutcomeDto, SessionCreatedResponse},
        sse::GameCompletedPayload,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState, StoreChange,
        session::{AnswerOutcome, OutcomeRecord, PlaySession, issue_session_id},
    },
};

/// Get or create a session bound to the configured question set.
///
/// A supplied non-blank identifier is reused as-is so a client keeps one
/// session per tab; anything else gets a freshly issued identifier.
pub fn create_session(state: &SharedState, requested: Option<String>) -> SessionCreatedResponse {
    let session_id = requested
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(issue_session_id);

    if !state.sessions().contains_key(&session_id) {
        let session = PlaySession::new(session_id.clone(), state.config().questions());
        state.sessions().insert(session_id.clone(), session);
        info!(%session_id, "created play session");
    }

    SessionCreatedResponse { session_id }
}

/// Current snapshot of a session.
pub fn snapshot(state: &SharedState, session_id: &str) -> Result<GameStateResponse, ServiceError> {
    let session = state
        .sessions()
        .get(session_id)
        .ok_or_else(|| unknown_session(session_id))?;
    Ok(GameStateResponse::from_session(&session))
}

/// Start a run under the given player name, creating the session when the
/// client has none yet.
pub fn start_game(
    state: &SharedState,
    requested_session: Option<String>,
    player_name: &str,
) -> Result<GameStateResponse, ServiceError> {
    let session_id = create_session(state, requested_session).session_id;
    let mut session = state
        .sessions()
        .get_mut(&session_id)
        .ok_or_else(|| unknown_session(&session_id))?;

    session.start(player_name)?;
    info!(%session_id, player_name = session.player_name(), "run started");
    Ok(GameStateResponse::from_session(&session))
}

/// Submit an answer for the session's current question.
///
/// Terminal transitions kick off the background persistence task after the
/// registry guard has been released.
pub fn submit_answer(
    state: &SharedState,
    session_id: &str,
    option_index: usize,
) -> Result<AnswerResponse, ServiceError> {
    let (response, terminal) = {
        let mut session = state
            .sessions()
            .get_mut(session_id)
            .ok_or_else(|| unknown_session(session_id))?;

        let outcome = session.select_answer(option_index)?;
        let snapshot = GameStateResponse::from_session(&session);

        let terminal = match &outcome {
            AnswerOutcome::Failed(record) | AnswerOutcome::Completed(record) => Some((
                record.clone(),
                session.player_name().map(str::to_owned),
            )),
            AnswerOutcome::Ignored | AnswerOutcome::Revealed => None,
        };

        let outcome_dto = match &outcome {
            AnswerOutcome::Failed(record) | AnswerOutcome::Completed(record) => {
                Some(OutcomeDto::from(record))
            }
            AnswerOutcome::Ignored | AnswerOutcome::Revealed => None,
        };

        (
            AnswerResponse {
                state: snapshot,
                outcome: outcome_dto,
            },
            terminal,
        )
    };

    if let Some((record, player_name)) = terminal {
        spawn_terminal_effects(state, session_id, player_name, record);
    }

    Ok(response)
}

/// Move to the next question after a correct reveal.
pub fn advance(state: &SharedState, session_id: &str) -> Result<GameStateResponse, ServiceError> {
    let mut session = state
        .sessions()
        .get_mut(session_id)
        .ok_or_else(|| unknown_session(session_id))?;

    session.advance()?;
    Ok(GameStateResponse::from_session(&session))
}

/// Reset a finished session back to the welcome screen.
pub fn restart(state: &SharedState, session_id: &str) -> Result<GameStateResponse, ServiceError> {
    let mut session = state
        .sessions()
        .get_mut(session_id)
        .ok_or_else(|| unknown_session(session_id))?;

    session.restart()?;
    info!(%session_id, "session restarted");
    Ok(GameStateResponse::from_session(&session))
}

fn unknown_session(session_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("unknown session `{session_id}`"))
}

/// Persist a terminal outcome, notify the change feed on success, and
/// announce the finish. Runs detached from the request that triggered it.
fn spawn_terminal_effects(
    state: &SharedState,
    session_id: &str,
    player_name: Option<String>,
    outcome: OutcomeRecord,
) {
    let state = Arc::clone(state);
    let record = NewResultRecord {
        session_id: session_id.to_owned(),
        player_name,
        score: outcome.score,
        total_questions: outcome.total_questions,
        time_spent: outcome.time_spent(),
        completed: outcome.completed,
    };
    let announcement = GameCompletedPayload {
        session_id: record.session_id.clone(),
        player_name: record.player_name.clone(),
        score: record.score,
        total_questions: record.total_questions,
        completed: record.completed,
        time_spent_seconds: outcome.display_seconds(),
    };

    tokio::spawn(async move {
        match state.result_store().await {
            Some(store) => match store.insert_result(record.clone()).await {
                Ok(()) => {
                    debug!(session_id = %record.session_id, "terminal outcome persisted");
                    state.notify_change(StoreChange::ResultInserted);
                }
                Err(err) => {
                    warn!(
                        session_id = %record.session_id,
                        error = %err,
                        "failed to persist terminal outcome; dropping the record"
                    );
                }
            },
            None => {
                warn!(
                    session_id = %record.session_id,
                    "storage unavailable; dropping terminal outcome"
                );
            }
        }

        // Only full clears are announced; failed runs surface through the
        // statistics refresh instead.
        if announcement.completed {
            sse_events::broadcast_game_completed(&state, &announcement);
        }
    });
}
