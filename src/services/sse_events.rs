use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        leaderboard::{LeaderboardEntryDto, PresenceResponse, StatsResponse},
        sse::{
            GameCompletedPayload, InfoPayload, LeaderboardUpdatedPayload, PresenceUpdatedPayload,
            ServerEvent,
        },
    },
    state::SharedState,
};

const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard.updated";
const EVENT_STATS_UPDATED: &str = "stats.updated";
const EVENT_PRESENCE_UPDATED: &str = "presence.updated";
const EVENT_GAME_COMPLETED: &str = "game.completed";
const EVENT_INFO: &str = "info";

/// Broadcast a freshly ranked leaderboard to all subscribers.
pub fn broadcast_leaderboard(state: &SharedState, entries: Vec<LeaderboardEntryDto>) {
    let payload = LeaderboardUpdatedPayload { entries };
    send_event(state, EVENT_LEADERBOARD_UPDATED, &payload);
}

/// Broadcast recomputed aggregate statistics.
pub fn broadcast_stats(state: &SharedState, stats: &StatsResponse) {
    send_event(state, EVENT_STATS_UPDATED, stats);
}

/// Broadcast the latest online-player estimate.
pub fn broadcast_presence(state: &SharedState, presence: &PresenceResponse) {
    let payload = PresenceUpdatedPayload {
        online_players: presence.online_players,
        live_count: presence.live_count,
    };
    send_event(state, EVENT_PRESENCE_UPDATED, &payload);
}

/// Announce one finished play-through.
pub fn broadcast_game_completed(state: &SharedState, payload: &GameCompletedPayload) {
    send_event(state, EVENT_GAME_COMPLETED, payload);
}

/// Send a human-readable info message onto the stream.
pub fn broadcast_info(state: &SharedState, message: &str) {
    let payload = InfoPayload {
        message: message.to_owned(),
    };
    send_event(state, EVENT_INFO, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(event, payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
