//! MongoDB-backed implementation of [`ResultStore`].
//!
//! The `results` collection is append-only. A compound index on
//! `(completed, score, time_spent)` backs the leaderboard query and an index
//! on `created_at` backs the presence windows.

use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::MongoResultDocument,
};
use crate::dao::{
    models::{NewResultRecord, ResultRecordEntity},
    result_store::ResultStore,
    storage::StorageResult,
};

const RESULT_COLLECTION_NAME: &str = "results";

/// Handle to the MongoDB backend. Cheap to clone.
#[derive(Clone)]
pub struct MongoResultStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoResultStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let collection = database.collection::<mongodb::bson::Document>(RESULT_COLLECTION_NAME);

        let leaderboard_index = mongodb::IndexModel::builder()
            .keys(doc! { "completed": 1, "score": -1, "time_spent": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("leaderboard_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(leaderboard_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RESULT_COLLECTION_NAME,
                index: "completed,score,time_spent",
                source,
            })?;

        let recency_index = mongodb::IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("created_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(recency_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RESULT_COLLECTION_NAME,
                index: "created_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection(&self) -> Collection<MongoResultDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoResultDocument>(RESULT_COLLECTION_NAME)
    }

    async fn insert_result(&self, record: NewResultRecord) -> MongoResult<()> {
        let document = MongoResultDocument::appended(record);
        let session_id = document.session_id().to_owned();
        let collection = self.collection().await;

        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertResult { session_id, source })?;

        Ok(())
    }

    async fn list_results(&self) -> MongoResult<Vec<ResultRecordEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoResultDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListResults { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn top_completed(&self, limit: usize) -> MongoResult<Vec<ResultRecordEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoResultDocument> = collection
            .find(doc! { "completed": true })
            .sort(doc! { "score": -1, "time_spent": 1 })
            .limit(limit as i64)
            .await
            .map_err(|source| MongoDaoError::TopCompleted { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::TopCompleted { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn session_ids_since(&self, cutoff: SystemTime) -> MongoResult<Vec<String>> {
        let collection = self.collection().await;
        let since = DateTime::from_system_time(cutoff);

        let values = collection
            .distinct("session_id", doc! { "created_at": { "$gte": since } })
            .await
            .map_err(|source| MongoDaoError::SessionsSince { source })?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(session_id) => Some(session_id),
                _ => None,
            })
            .collect())
    }

    async fn count_since(&self, cutoff: SystemTime) -> MongoResult<u64> {
        let collection = self.collection().await;
        let since = DateTime::from_system_time(cutoff);

        collection
            .count_documents(doc! { "created_at": { "$gte": since } })
            .await
            .map_err(|source| MongoDaoError::CountSince { source })
    }
}

impl ResultStore for MongoResultStore {
    fn insert_result(&self, record: NewResultRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_result(record).await.map_err(Into::into) })
    }

    fn list_results(&self) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_results().await.map_err(Into::into) })
    }

    fn top_completed(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ResultRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.top_completed(limit).await.map_err(Into::into) })
    }

    fn session_ids_since(
        &self,
        cutoff: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { store.session_ids_since(cutoff).await.map_err(Into::into) })
    }

    fn count_since(&self, cutoff: SystemTime) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_since(cutoff).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
