#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;

use crate::dao::models::{NewResultRecord, ResultRecordEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the append-only result collection.
///
/// Writes are insert-only; read operations serve the leaderboard, aggregate
/// statistics, and the presence estimate.
pub trait ResultStore: Send + Sync {
    /// Append one terminal outcome record.
    fn insert_result(&self, record: NewResultRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Full scan used for aggregate statistics.
    fn list_results(&self) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>>;
    /// Completed rows ordered by score descending then time ascending.
    fn top_completed(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>>;
    /// Distinct session identifiers of rows created after the cutoff.
    fn session_ids_since(
        &self,
        cutoff: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Number of rows created after the cutoff.
    fn count_since(&self, cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
