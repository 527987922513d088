//! Service layer: game orchestration, leaderboard views, realtime feeds, and
//! the storage supervisor.

pub mod documentation;
pub mod feed_service;
pub mod game_service;
pub mod health_service;
pub mod leaderboard_service;
pub mod sse_events;
pub mod sse_service;
pub mod storage_supervisor;
