//! Shared runtime state: session registry, storage handle, and event channels.

pub mod question;
pub mod session;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast, watch};

use crate::{
    config::AppConfig, dao::result_store::ResultStore, error::ServiceError,
    state::session::PlaySession,
};

pub use self::sse::SseHub;
pub use self::state_machine::{InvalidTransition, QuizEvent, QuizPhase};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

const SSE_CHANNEL_CAPACITY: usize = 16;
const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Notification that the persisted result collection changed.
///
/// Carries no payload beyond the kind of change; consumers are expected to
/// re-query the store rather than patch a cached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// A terminal outcome record was appended.
    ResultInserted,
}

/// Central application state storing active play sessions, the storage
/// handle, and the realtime channels.
pub struct AppState {
    config: AppConfig,
    result_store: RwLock<Option<Arc<dyn ResultStore>>>,
    sse: SseHub,
    sessions: DashMap<String, PlaySession>,
    changes: broadcast::Sender<StoreChange>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a result store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let (changes_tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Arc::new(Self {
            config,
            result_store: RwLock::new(None),
            sse: SseHub::new(SSE_CHANNEL_CAPACITY),
            sessions: DashMap::new(),
            changes: changes_tx,
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current result store, if one is installed.
    pub async fn result_store(&self) -> Option<Arc<dyn ResultStore>> {
        let guard = self.result_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the result store or fail with a degraded-mode error.
    pub async fn require_result_store(&self) -> Result<Arc<dyn ResultStore>, ServiceError> {
        self.result_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new result store implementation and leave degraded mode.
    pub async fn install_result_store(&self, store: Arc<dyn ResultStore>) {
        {
            let mut guard = self.result_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current result store and enter degraded mode.
    pub async fn clear_result_store(&self) {
        {
            let mut guard = self.result_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag. The flag is the source of truth; a store can
    /// be installed yet unhealthy while the supervisor retries.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Broadcast hub used for the realtime SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Registry of live play sessions keyed by their session identifier.
    pub fn sessions(&self) -> &DashMap<String, PlaySession> {
        &self.sessions
    }

    /// Publish a change notice to the in-process change feed.
    pub fn notify_change(&self, change: StoreChange) {
        let _ = self.changes.send(change);
    }

    /// Subscribe to change notices emitted after successful writes.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
