//! Leaderboard, statistics, and presence queries.
//!
//! Reads go to the storage backend when it is available. The ranked
//! leaderboard is mirrored to a local JSON file on every successful fetch so
//! degraded mode can still serve the last known standings.

use std::time::SystemTime;

use tracing::{debug, warn};

use crate::{
    dao::models::ResultRecordEntity,
    dto::leaderboard::{LeaderboardEntryDto, LeaderboardResponse, PresenceResponse, StatsResponse},
    error::ServiceError,
    state::SharedState,
};

/// Rank raw result rows into leaderboard entries.
///
/// Only completed runs qualify. Ties on score are broken by the faster run.
pub fn rank(rows: Vec<ResultRecordEntity>, limit: usize) -> Vec<LeaderboardEntryDto> {
    let mut completed: Vec<ResultRecordEntity> =
        rows.into_iter().filter(|row| row.completed).collect();
    completed.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.time_spent.cmp(&b.time_spent))
    });
    completed.truncate(limit);

    completed
        .into_iter()
        .enumerate()
        .map(|(index, entity)| (index + 1, entity).into())
        .collect()
}

/// Compute aggregate statistics. Every recorded run counts as a player, but
/// the average and the perfect-score tally only consider completed runs.
pub fn compute_stats(rows: &[ResultRecordEntity]) -> StatsResponse {
    let total_players = rows.len() as u64;

    let completed: Vec<&ResultRecordEntity> = rows.iter().filter(|row| row.completed).collect();
    let average_score = if completed.is_empty() {
        0.0
    } else {
        let sum: u64 = completed.iter().map(|row| u64::from(row.score)).sum();
        let mean = sum as f64 / completed.len() as f64;
        (mean * 10.0).round() / 10.0
    };
    let perfect_scores = completed
        .iter()
        .filter(|row| row.score == row.total_questions)
        .count() as u64;

    StatsResponse {
        total_players,
        average_score,
        perfect_scores,
    }
}

/// Fetch the ranked leaderboard, preferring the storage backend and falling
/// back to the local mirror when the backend cannot answer.
pub async fn fetch_leaderboard(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<LeaderboardResponse, ServiceError> {
    let mirror_limit = state.config().leaderboard_limit();
    let requested = limit.unwrap_or(mirror_limit);

    match state.result_store().await {
        Some(store) => match store.top_completed(requested.max(mirror_limit)).await {
            Ok(rows) => {
                // The mirror always holds the configured top rows; a narrower
                // request must not shrink what degraded mode serves later.
                let mut entries = rank(rows, requested.max(mirror_limit));
                write_mirror(state, &entries[..entries.len().min(mirror_limit)]).await;
                entries.truncate(requested);
                Ok(LeaderboardResponse {
                    entries,
                    from_cache: false,
                })
            }
            Err(err) => {
                warn!(error = %err, "leaderboard query failed; trying the local mirror");
                match read_mirror(state).await {
                    Some(mut entries) => {
                        entries.truncate(requested);
                        Ok(LeaderboardResponse {
                            entries,
                            from_cache: true,
                        })
                    }
                    None => Err(err.into()),
                }
            }
        },
        None => match read_mirror(state).await {
            Some(mut entries) => {
                entries.truncate(requested);
                Ok(LeaderboardResponse {
                    entries,
                    from_cache: true,
                })
            }
            None => Err(ServiceError::Degraded),
        },
    }
}

/// Fetch aggregate statistics from the storage backend.
pub async fn fetch_stats(state: &SharedState) -> Result<StatsResponse, ServiceError> {
    let store = state.require_result_store().await?;
    let rows = store.list_results().await?;
    Ok(compute_stats(&rows))
}

/// Fetch the online-player estimate from the storage backend.
///
/// A session counts as online when it wrote a result within the presence
/// window. The live counter adds one for the asking client, so it never
/// drops below one.
pub async fn fetch_presence(state: &SharedState) -> Result<PresenceResponse, ServiceError> {
    let store = state.require_result_store().await?;
    let now = SystemTime::now();

    let presence_cutoff = now
        .checked_sub(state.config().presence_window())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let live_cutoff = now
        .checked_sub(state.config().live_window())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let online_players = store.session_ids_since(presence_cutoff).await?.len();
    let live_count = store.count_since(live_cutoff).await? + 1;

    Ok(PresenceResponse {
        online_players,
        live_count,
    })
}

async fn write_mirror(state: &SharedState, entries: &[LeaderboardEntryDto]) {
    let path = state.config().cache_path();

    let payload = match serde_json::to_vec_pretty(entries) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize leaderboard mirror");
            return;
        }
    };

    if let Some(parent) = path.parent()
        && let Err(err) = tokio::fs::create_dir_all(parent).await
    {
        warn!(path = %path.display(), error = %err, "failed to create mirror directory");
        return;
    }

    if let Err(err) = tokio::fs::write(path, payload).await {
        warn!(path = %path.display(), error = %err, "failed to write leaderboard mirror");
    }
}

async fn read_mirror(state: &SharedState) -> Option<Vec<LeaderboardEntryDto>> {
    let path = state.config().cache_path();

    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "leaderboard mirror unavailable");
            return None;
        }
    };

    match serde_json::from_slice(&contents) {
        Ok(entries) => Some(entries),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "leaderboard mirror is corrupt; ignoring it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{path::PathBuf, sync::Arc, time::SystemTime};

    use futures::future::BoxFuture;

    use crate::{
        config::AppConfig,
        dao::{
            models::NewResultRecord,
            result_store::ResultStore,
            storage::StorageResult,
        },
        state::AppState,
    };

    fn row(score: u32, time_spent: u64, completed: bool) -> ResultRecordEntity {
        ResultRecordEntity {
            id: None,
            session_id: format!("session_{score}_{time_spent}"),
            player_name: Some("player".into()),
            score,
            total_questions: 5,
            time_spent,
            completed,
            created_at: SystemTime::now(),
        }
    }

    struct FixedStore(Vec<ResultRecordEntity>);

    impl ResultStore for FixedStore {
        fn insert_result(&self, _record: NewResultRecord) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn list_results(&self) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
            let rows = self.0.clone();
            Box::pin(async move { Ok(rows) })
        }

        fn top_completed(
            &self,
            limit: usize,
        ) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
            let mut rows: Vec<_> = self.0.iter().filter(|r| r.completed).cloned().collect();
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
            Box::pin(async { Ok(Vec::new()) })
        }

        fn count_since(&self, _cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
            Box::pin(async { Ok(0) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn mirror_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "policymaker-mirror-{}-{tag}.json",
            std::process::id()
        ))
    }

    #[test]
    fn rank_orders_by_score_then_time() {
        let rows = vec![row(5, 20, true), row(3, 10, true), row(5, 15, true)];
        let entries = rank(rows, 10);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].score, 5);
        assert_eq!(entries[0].time_spent, 15);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].score, 5);
        assert_eq!(entries[1].time_spent, 20);
        assert_eq!(entries[2].score, 3);
        assert_eq!(entries[2].rank, 3);
    }

    #[test]
    fn rank_drops_unfinished_runs_and_truncates() {
        let rows = vec![
            row(5, 10, true),
            row(4, 10, false),
            row(3, 10, true),
            row(2, 10, true),
        ];
        let entries = rank(rows, 2);

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.score != 4));
    }

    #[test]
    fn stats_average_covers_completed_runs_only() {
        let mut perfect = row(5, 10, true);
        perfect.total_questions = 5;
        let rows = vec![perfect, row(3, 10, true), row(2, 10, false)];
        let stats = compute_stats(&rows);

        // Every run counts as a player; the failed one is excluded from the
        // average. Mean of 5 and 3 is 4.0.
        assert_eq!(stats.total_players, 3);
        assert_eq!(stats.average_score, 4.0);
        assert_eq!(stats.perfect_scores, 1);
    }

    #[test]
    fn stats_average_rounds_to_one_decimal() {
        let rows = vec![row(5, 10, true), row(4, 10, true), row(2, 10, true)];
        let stats = compute_stats(&rows);

        // mean of 5, 4, 2 is 3.666..
        assert_eq!(stats.average_score, 3.7);
    }

    #[test]
    fn stats_on_empty_collection_are_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_players, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.perfect_scores, 0);
    }

    #[tokio::test]
    async fn narrow_requests_do_not_shrink_the_mirror() {
        let path = mirror_path("narrow");
        let state = AppState::new(AppConfig::default().with_cache_path(path.clone()));
        let rows = vec![row(5, 10, true), row(4, 12, true), row(3, 9, true)];
        state.install_result_store(Arc::new(FixedStore(rows))).await;

        let narrow = fetch_leaderboard(&state, Some(1)).await.unwrap();
        assert_eq!(narrow.entries.len(), 1);
        assert_eq!(narrow.entries[0].score, 5);
        assert!(!narrow.from_cache);

        // Degraded mode still serves the full standings, not the last
        // request's slice.
        state.clear_result_store().await;
        let fallback = fetch_leaderboard(&state, None).await.unwrap();
        assert!(fallback.from_cache);
        assert_eq!(fallback.entries.len(), 3);
        assert_eq!(fallback.entries[0].score, 5);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn mirror_fallback_honours_the_requested_limit() {
        let path = mirror_path("fallback-limit");
        let state = AppState::new(AppConfig::default().with_cache_path(path.clone()));
        let rows = vec![row(5, 10, true), row(4, 12, true), row(3, 9, true)];
        state.install_result_store(Arc::new(FixedStore(rows))).await;

        fetch_leaderboard(&state, None).await.unwrap();

        state.clear_result_store().await;
        let fallback = fetch_leaderboard(&state, Some(2)).await.unwrap();
        assert!(fallback.from_cache);
        assert_eq!(fallback.entries.len(), 2);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn perfect_score_requires_completion() {
        // A run that failed on its last question has score == total only when
        // the counters were tampered with; guard on the completed flag anyway.
        let mut failed = row(5, 10, false);
        failed.total_questions = 5;
        let stats = compute_stats(&[failed]);
        assert_eq!(stats.perfect_scores, 0);
    }
}
