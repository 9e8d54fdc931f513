use crate::search::types::{SearchResult, SearchSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a search task.
///
/// Wrapper around a UUID string to ensure global uniqueness across the
/// process lifetime. Returned to the caller at submission and used for
/// all later status lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents the lifecycle state of a search task.
///
/// Serialized as the lowercase state name, which is what clients see in the
/// status endpoint (`"queued"`, `"running"`, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task has been submitted but the orchestrator run has not started yet.
    Queued,
    /// The orchestrator is currently driving the search.
    Running,
    /// Task finished successfully; `result` is populated.
    Completed,
    /// Task execution failed; `error` is populated.
    Failed,
}

impl TaskStatus {
    /// Terminal states can never be left again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// The internal representation of a task stored within the `TaskRegistry`.
///
/// Invariant: at most one of `result`/`error` is set, and it is set exactly
/// when `status` is the matching terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    /// The search parameters this task was created from. Immutable.
    pub spec: SearchSpec,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Last progress message written by the orchestrator, last-write-wins.
    pub progress: Option<String>,
    /// Final result, set once on transition to `Completed`.
    pub result: Option<SearchResult>,
    /// Human-readable failure description, set once on transition to `Failed`.
    pub error: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// One row of the task listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Full task snapshot returned by the status endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub progress: Option<String>,
    pub result: Option<SearchResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TaskStatusResponse {
    pub fn from_entry(task_id: TaskId, entry: TaskEntry) -> Self {
        Self {
            task_id,
            status: entry.status,
            progress: entry.progress,
            result: entry.result,
            error: entry.error,
            created_at: entry.created_at,
        }
    }
}

/// Response format of the task listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub total: usize,
    pub tasks: Vec<TaskSummary>,
}
