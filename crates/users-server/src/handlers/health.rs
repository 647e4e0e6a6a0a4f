use axum::{extract::State, Json};
use users_shared::api::HealthResponse;

use crate::routes::AppState;

/// GET /health
///
/// Static deployment info; the store is not contacted.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        environment: state.config.environment.clone(),
        project_id: state.config.project_id.clone(),
    })
}
