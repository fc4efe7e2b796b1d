use super::AppState;
use crate::health::{HealthReport, Status};
use axum::{Json, extract::State, http::StatusCode};

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.report().await;
    let code = match report.status {
        Status::Ok | Status::Warning => StatusCode::OK,
        Status::Critical => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(report))
}
