use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::game::{
        AnswerRequest, AnswerResponse, CreateSessionRequest, GameStateResponse,
        SessionCreatedResponse, SessionRequest, StartGameRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling the play-session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/game/start", post(start_game))
        .route("/game/answer", post(submit_answer))
        .route("/game/advance", post(advance))
        .route("/game/restart", post(restart))
        .route("/game/{session_id}", get(game_state))
}

/// Get or create a play session.
#[utoipa::path(
    post,
    path = "/session",
    tag = "game",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session ready", body = SessionCreatedResponse)
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<Json<SessionCreatedResponse>, AppError> {
    let requested = payload.and_then(|Json(body)| body.session_id);
    Ok(Json(game_service::create_session(&state, requested)))
}

/// Start a run under the supplied player name.
#[utoipa::path(
    post,
    path = "/game/start",
    tag = "game",
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Run started", body = GameStateResponse),
        (status = 400, description = "Blank player name"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not on the welcome screen")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<GameStateResponse>, AppError> {
    payload.validate()?;
    let snapshot =
        game_service::start_game(&state, payload.session_id, &payload.player_name)?;
    Ok(Json(snapshot))
}

/// Submit an answer for the current question.
#[utoipa::path(
    post,
    path = "/game/answer",
    tag = "game",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer applied", body = AnswerResponse),
        (status = 400, description = "Option index out of range"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not accepting answers")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let response = game_service::submit_answer(&state, &payload.session_id, payload.option_index)?;
    Ok(Json(response))
}

/// Move to the next question after a correct reveal.
#[utoipa::path(
    post,
    path = "/game/advance",
    tag = "game",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Moved to the next question", body = GameStateResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "No correct reveal to advance from")
    )
)]
pub async fn advance(
    State(state): State<SharedState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<GameStateResponse>, AppError> {
    let snapshot = game_service::advance(&state, &payload.session_id)?;
    Ok(Json(snapshot))
}

/// Reset a finished session back to the welcome screen.
#[utoipa::path(
    post,
    path = "/game/restart",
    tag = "game",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session reset", body = GameStateResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not in a terminal phase")
    )
)]
pub async fn restart(
    State(state): State<SharedState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<GameStateResponse>, AppError> {
    let snapshot = game_service::restart(&state, &payload.session_id)?;
    Ok(Json(snapshot))
}

/// Current snapshot of a session.
#[utoipa::path(
    get,
    path = "/game/{session_id}",
    tag = "game",
    params(("session_id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Session snapshot", body = GameStateResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn game_state(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<GameStateResponse>, AppError> {
    let snapshot = game_service::snapshot(&state, &session_id)?;
    Ok(Json(snapshot))
}
