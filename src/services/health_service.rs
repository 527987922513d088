use crate::{dto::health::HealthResponse, state::SharedState};

/// Report the current service health, reflecting the storage mode.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::healthy()
    }
}
