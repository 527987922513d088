use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{dao::models::ResultRecordEntity, dto::format_system_time};

/// Optional query parameters for the leaderboard endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Maximum number of rows to return; defaults to the configured limit.
    pub limit: Option<usize>,
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntryDto {
    /// 1-based rank, best first.
    pub rank: usize,
    /// Name the player ran under, if any.
    pub player_name: Option<String>,
    /// Final score.
    pub score: u32,
    /// Size of the question set that was cleared.
    pub total_questions: u32,
    /// Whole seconds the run took.
    pub time_spent: u64,
    /// RFC 3339 timestamp of when the result was recorded.
    pub created_at: String,
}

impl From<(usize, ResultRecordEntity)> for LeaderboardEntryDto {
    fn from((rank, entity): (usize, ResultRecordEntity)) -> Self {
        Self {
            rank,
            player_name: entity.player_name,
            score: entity.score,
            total_questions: entity.total_questions,
            time_spent: entity.time_spent,
            created_at: format_system_time(entity.created_at),
        }
    }
}

/// Ranked leaderboard as served over REST.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Ranked rows, best first.
    pub entries: Vec<LeaderboardEntryDto>,
    /// True when the rows came from the local fallback mirror instead of the
    /// storage backend.
    pub from_cache: bool,
}

/// Aggregate statistics over every recorded play-through.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total number of recorded runs, finished or failed.
    pub total_players: u64,
    /// Mean score across all runs, rounded to one decimal place.
    pub average_score: f64,
    /// Runs that cleared the full set with a perfect score.
    pub perfect_scores: u64,
}

/// Online-player estimate as served over REST.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresenceResponse {
    /// Distinct sessions seen within the presence window.
    pub online_players: usize,
    /// Live-activity estimate over the short window, never below one.
    pub live_count: u64,
}
