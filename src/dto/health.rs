use serde::Serialize;
use utoipa::ToSchema;

/// Liveness report including the storage mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: &'static str,
    /// Storage backend state: `connected` or `unavailable`.
    pub storage: &'static str,
}

impl HealthResponse {
    /// Report for a fully operational service.
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            storage: "connected",
        }
    }

    /// Report for degraded mode, where writes are dropped and reads fall
    /// back to the local mirror.
    pub fn degraded() -> Self {
        Self {
            status: "degraded",
            storage: "unavailable",
        }
    }
}
