use super::service::SearchService;
use super::types::{ErrorResponse, SearchSpec, SubmitSearchResponse};
use crate::registry::types::TaskStatus;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse, response::Response};
use std::sync::Arc;

pub async fn handle_submit_search(
    Extension(service): Extension<Arc<SearchService>>,
    Json(spec): Json<SearchSpec>,
) -> Response {
    match service.submit(spec) {
        Ok(task_id) => {
            tracing::info!("Search task submitted: {}", task_id.0);
            (
                StatusCode::ACCEPTED,
                Json(SubmitSearchResponse {
                    task_id,
                    status: TaskStatus::Queued,
                    message: "Search task created. Use the task_id to check status at /status/{task_id}".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Rejected search submission: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
