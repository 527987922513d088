use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Policymaker backend.
#[openapi(
    paths(
        crate::routes::game::create_session,
        crate::routes::game::start_game,
        crate::routes::game::submit_answer,
        crate::routes::game::advance,
        crate::routes::game::restart,
        crate::routes::game::game_state,
        crate::routes::leaderboard::leaderboard,
        crate::routes::leaderboard::stats,
        crate::routes::leaderboard::presence,
        crate::routes::health::healthcheck,
        crate::routes::sse::event_stream,
    ),
    components(
        schemas(
            crate::dto::game::CreateSessionRequest,
            crate::dto::game::StartGameRequest,
            crate::dto::game::AnswerRequest,
            crate::dto::game::SessionRequest,
            crate::dto::game::SessionCreatedResponse,
            crate::dto::game::GameStateResponse,
            crate::dto::game::AnswerResponse,
            crate::dto::game::QuestionView,
            crate::dto::game::RevealDto,
            crate::dto::game::OutcomeDto,
            crate::dto::game::PhaseDto,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::LeaderboardEntryDto,
            crate::dto::leaderboard::StatsResponse,
            crate::dto::leaderboard::PresenceResponse,
            crate::dto::health::HealthResponse,
        )
    ),
    tags(
        (name = "game", description = "Play session lifecycle"),
        (name = "leaderboard", description = "Rankings, statistics, and presence"),
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
