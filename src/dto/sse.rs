//! Event envelope and payloads carried over the SSE stream.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::leaderboard::{LeaderboardEntryDto, StatsResponse};

/// One named event pushed to SSE subscribers, with a pre-serialized payload.
#[derive(Debug, Clone)]
pub struct ServerEvent {
    /// SSE event name.
    pub event: String,
    /// JSON-encoded payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event by serializing the payload to JSON.
    pub fn json<T: Serialize>(event: &str, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: event.to_owned(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Payload of a leaderboard refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardUpdatedPayload {
    /// Ranked top rows, best first.
    pub entries: Vec<LeaderboardEntryDto>,
}

/// Payload of a statistics refresh. Same shape as the REST response.
pub type StatsUpdatedPayload = StatsResponse;

/// Payload of a presence refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct PresenceUpdatedPayload {
    /// Distinct sessions seen within the presence window.
    pub online_players: usize,
    /// Live-activity estimate over the short window, never below one.
    pub live_count: u64,
}

/// Payload announcing one finished play-through.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCompletedPayload {
    /// Session that finished.
    pub session_id: String,
    /// Name the player ran under, if any.
    pub player_name: Option<String>,
    /// Final score.
    pub score: u32,
    /// Questions attempted.
    pub total_questions: u32,
    /// Whether the full set was cleared.
    pub completed: bool,
    /// Elapsed seconds, rounded for display.
    pub time_spent_seconds: f64,
}

/// Free-form informational message.
#[derive(Debug, Serialize, ToSchema)]
pub struct InfoPayload {
    /// Human-readable message.
    pub message: String,
}
