use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub timestamp: DateTime<Utc>,
    pub environment: &'static str,
}

/// Axum handler for `GET /api/health`. Never touches the database.
pub async fn health_handler(State(state): State<AppState>) -> ApiResponse<HealthData> {
    ApiResponse::ok(
        "CMS API is running successfully",
        HealthData {
            timestamp: Utc::now(),
            environment: state.environment.as_str(),
        },
    )
}
