use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Outcome of one play-through as it is handed to the store for appending.
///
/// The store assigns the record identifier and creation timestamp; callers
/// never supply them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewResultRecord {
    /// Identifier of the session that produced this outcome.
    pub session_id: String,
    /// Display name supplied by the player, if any.
    pub player_name: Option<String>,
    /// Points accumulated before the run ended.
    pub score: u32,
    /// 1-based count of questions attempted.
    pub total_questions: u32,
    /// Elapsed play time in whole seconds.
    pub time_spent: u64,
    /// True only when every question was answered correctly.
    pub completed: bool,
}

/// Persisted outcome row read back from the store. Append-only: rows are
/// never updated or deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRecordEntity {
    /// Store-assigned record identifier.
    pub id: Option<String>,
    /// Identifier of the session that produced this outcome.
    pub session_id: String,
    /// Display name supplied by the player, if any.
    pub player_name: Option<String>,
    /// Points accumulated before the run ended.
    pub score: u32,
    /// 1-based count of questions attempted.
    pub total_questions: u32,
    /// Elapsed play time in whole seconds.
    pub time_spent: u64,
    /// True only when every question was answered correctly.
    pub completed: bool,
    /// Store-assigned creation timestamp.
    pub created_at: SystemTime,
}
