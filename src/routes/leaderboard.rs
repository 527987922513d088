use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse, PresenceResponse, StatsResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Routes serving the leaderboard, statistics, and presence views.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/leaderboard/stats", get(stats))
        .route("/presence", get(presence))
}

/// Top completed runs, best score first with faster runs breaking ties.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked leaderboard", body = LeaderboardResponse),
        (status = 503, description = "Storage unavailable and no local mirror")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = leaderboard_service::fetch_leaderboard(&state, query.limit).await?;
    Ok(Json(response))
}

/// Aggregate statistics over every recorded run.
#[utoipa::path(
    get,
    path = "/leaderboard/stats",
    tag = "leaderboard",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, AppError> {
    let response = leaderboard_service::fetch_stats(&state).await?;
    Ok(Json(response))
}

/// Online-player estimate derived from recent result rows.
#[utoipa::path(
    get,
    path = "/presence",
    tag = "leaderboard",
    responses(
        (status = 200, description = "Online-player estimate", body = PresenceResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn presence(
    State(state): State<SharedState>,
) -> Result<Json<PresenceResponse>, AppError> {
    let response = leaderboard_service::fetch_presence(&state).await?;
    Ok(Json(response))
}
