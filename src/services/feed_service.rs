//! Background tasks feeding the realtime stream.
//!
//! The change feed listens for write notifications and re-queries the store
//! for a full view instead of patching deltas, so every broadcast reflects
//! the backend's current truth. The presence poller runs on a fixed interval
//! independent of writes.

use tokio::{
    sync::broadcast::error::RecvError,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::{
    services::{leaderboard_service, sse_events},
    state::{SharedState, StoreChange},
};

/// React to store changes by rebroadcasting the leaderboard and statistics.
///
/// Runs until the state is dropped.
pub async fn run_change_feed(state: SharedState) {
    let mut changes = state.subscribe_changes();

    loop {
        match changes.recv().await {
            Ok(StoreChange::ResultInserted) => refresh_views(&state).await,
            Err(RecvError::Lagged(skipped)) => {
                // A full refresh covers everything the lag skipped.
                warn!(skipped, "change feed lagged; refreshing views once");
                refresh_views(&state).await;
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn refresh_views(state: &SharedState) {
    match leaderboard_service::fetch_leaderboard(state, None).await {
        Ok(response) => sse_events::broadcast_leaderboard(state, response.entries),
        Err(err) => warn!(error = %err, "failed to refresh the leaderboard view"),
    }

    match leaderboard_service::fetch_stats(state).await {
        Ok(stats) => sse_events::broadcast_stats(state, &stats),
        Err(err) => warn!(error = %err, "failed to refresh the statistics view"),
    }
}

/// Periodically recompute and broadcast the online-player estimate.
///
/// Skips ticks while the service runs degraded; presence has no local
/// fallback worth serving.
pub async fn run_presence_poll(state: SharedState) {
    let mut ticker = interval(state.config().presence_poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if state.is_degraded().await {
            continue;
        }

        match leaderboard_service::fetch_presence(&state).await {
            Ok(presence) => sse_events::broadcast_presence(&state, &presence),
            Err(err) => debug!(error = %err, "presence poll failed; will retry next tick"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::{Duration, SystemTime},
    };

    use futures::future::BoxFuture;

    use crate::{
        config::AppConfig,
        dao::{
            models::{NewResultRecord, ResultRecordEntity},
            result_store::ResultStore,
            storage::StorageResult,
        },
        state::AppState,
        state::question::{AnswerOption, Difficulty, Question, QuestionSet},
    };

    struct FixedStore {
        rows: Mutex<Vec<ResultRecordEntity>>,
    }

    impl FixedStore {
        fn with_rows(rows: Vec<ResultRecordEntity>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn rows(&self) -> Vec<ResultRecordEntity> {
            self.rows.lock().unwrap().clone()
        }
    }

    impl ResultStore for FixedStore {
        fn insert_result(&self, _record: NewResultRecord) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn list_results(&self) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
            let rows = self.rows();
            Box::pin(async move { Ok(rows) })
        }

        fn top_completed(
            &self,
            limit: usize,
        ) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
            let mut rows: Vec<_> = self.rows().into_iter().filter(|r| r.completed).collect();
            rows.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.time_spent.cmp(&b.time_spent))
            });
            rows.truncate(limit);
            Box::pin(async move { Ok(rows) })
        }

        fn session_ids_since(
            &self,
            _cutoff: SystemTime,
        ) -> BoxFuture<'static, StorageResult<Vec<String>>> {
            let ids = self.rows().into_iter().map(|row| row.session_id).collect();
            Box::pin(async move { Ok(ids) })
        }

        fn count_since(&self, _cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
            let count = self.rows().len() as u64;
            Box::pin(async move { Ok(count) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn row(session: &str, score: u32) -> ResultRecordEntity {
        ResultRecordEntity {
            id: None,
            session_id: session.into(),
            player_name: Some("player".into()),
            score,
            total_questions: 3,
            time_spent: 30,
            completed: true,
            created_at: SystemTime::now(),
        }
    }

    fn app_state() -> crate::state::SharedState {
        let questions = QuestionSet::new(vec![Question {
            id: 1,
            prompt: "prompt".into(),
            scenario: "scenario".into(),
            difficulty: Difficulty::Basic,
            options: vec![
                AnswerOption {
                    text: "wrong".into(),
                    is_correct: false,
                    explanation: "no".into(),
                },
                AnswerOption {
                    text: "right".into(),
                    is_correct: true,
                    explanation: "yes".into(),
                },
            ],
        }])
        .unwrap();
        AppState::new(AppConfig::with_question_set(questions))
    }

    #[tokio::test]
    async fn change_notice_triggers_leaderboard_and_stats_events() {
        let state = app_state();
        state
            .install_result_store(Arc::new(FixedStore::with_rows(vec![
                row("session_a", 3),
                row("session_b", 2),
            ])))
            .await;

        let mut events = state.sse().subscribe();
        let feed = tokio::spawn(run_change_feed(Arc::clone(&state)));

        // Let the feed task subscribe before the first notice is sent.
        tokio::time::sleep(Duration::from_millis(50)).await;
        state.notify_change(StoreChange::ResultInserted);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let first = events.try_recv().unwrap();
        assert_eq!(first.event, "leaderboard.updated");
        assert!(first.data.contains("session_a") || first.data.contains("rank"));

        let second = events.try_recv().unwrap();
        assert_eq!(second.event, "stats.updated");
        assert!(second.data.contains("total_players"));

        feed.abort();
    }

    #[tokio::test]
    async fn presence_poll_broadcasts_an_estimate() {
        let state = app_state();
        state
            .install_result_store(Arc::new(FixedStore::with_rows(vec![row("session_a", 3)])))
            .await;

        let mut events = state.sse().subscribe();
        let poll = tokio::spawn(run_presence_poll(Arc::clone(&state)));

        // First tick of the interval fires immediately.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let event = events.try_recv().unwrap();
        assert_eq!(event.event, "presence.updated");
        assert!(event.data.contains("live_count"));

        poll.abort();
    }
}
