use super::store::TaskRegistry;
use super::types::{ListTasksResponse, TaskId, TaskStatusResponse};

use axum::{Extension, Json, extract::Path, http::StatusCode};
use std::sync::Arc;

pub async fn handle_get_task_status(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Path(task_id_str): Path<String>,
) -> (StatusCode, Json<Option<TaskStatusResponse>>) {
    let task_id = TaskId(task_id_str);

    match registry.get(&task_id) {
        Some(entry) => {
            tracing::debug!("Task status query: {} -> {:?}", task_id.0, entry.status);
            (
                StatusCode::OK,
                Json(Some(TaskStatusResponse::from_entry(task_id, entry))),
            )
        }
        None => {
            tracing::debug!("Task not found: {}", task_id.0);
            (StatusCode::NOT_FOUND, Json(None))
        }
    }
}

pub async fn handle_list_tasks(
    Extension(registry): Extension<Arc<TaskRegistry>>,
) -> Json<ListTasksResponse> {
    let tasks = registry.list();

    Json(ListTasksResponse {
        total: tasks.len(),
        tasks,
    })
}
