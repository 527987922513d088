use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::dao::models::{NewResultRecord, ResultRecordEntity};

/// Wire representation of one result row in the `results` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoResultDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    session_id: String,
    player_name: Option<String>,
    score: u32,
    total_questions: u32,
    time_spent: u32,
    completed: bool,
    created_at: DateTime,
}

impl MongoResultDocument {
    /// Build the document to append, assigning the creation timestamp at the
    /// store boundary so callers never supply it.
    pub fn appended(record: NewResultRecord) -> Self {
        Self {
            id: None,
            session_id: record.session_id,
            player_name: record.player_name,
            score: record.score,
            total_questions: record.total_questions,
            time_spent: record.time_spent.min(u32::MAX as u64) as u32,
            completed: record.completed,
            created_at: DateTime::now(),
        }
    }

    /// Session identifier carried by this document.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl From<MongoResultDocument> for ResultRecordEntity {
    fn from(value: MongoResultDocument) -> Self {
        Self {
            id: value.id.map(|oid| oid.to_hex()),
            session_id: value.session_id,
            player_name: value.player_name,
            score: value.score,
            total_questions: value.total_questions,
            time_spent: value.time_spent as u64,
            completed: value.completed,
            created_at: value.created_at.to_system_time(),
        }
    }
}
