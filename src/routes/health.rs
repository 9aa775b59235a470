use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::SurveyRepository;
use crate::AppState;

pub async fn health<R: SurveyRepository>(State(state): State<AppState<R>>) -> impl IntoResponse {
    match state.survey_service.repository().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "storage": "up" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "storage": "down" })),
            )
        }
    }
}
