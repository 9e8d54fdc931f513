//! In-Memory Task Store
//!
//! Implements the task registry: a concurrent map from `TaskId` to `TaskEntry`
//! plus an insertion-order journal for the listing endpoint.
//!
//! ## Responsibilities
//! - **Identity**: Allocating unique task ids at creation.
//! - **Transitions**: Enforcing the monotonic state machine
//!   (`Queued -> Running -> Completed | Failed`).
//! - **Snapshots**: Read operations clone the entry under its map guard, so a
//!   poller never observes a torn state (e.g. `completed` with a null result).
//!
//! Tasks are retained for the process lifetime. There is no eviction; all
//! access goes through this type, so capping or persistence can be added here
//! later without changing any caller.

use super::types::{TaskEntry, TaskId, TaskStatus, TaskSummary};
use crate::search::types::{SearchResult, SearchSpec};

use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// The central component managing task state.
pub struct TaskRegistry {
    /// Task storage. `DashMap` for safe concurrent access from the HTTP
    /// handlers and the per-task orchestrator runs.
    tasks: DashMap<TaskId, TaskEntry>,
    /// Task ids in creation order, for the listing endpoint.
    order: Mutex<Vec<TaskId>>,
}

impl TaskRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: DashMap::new(),
            order: Mutex::new(Vec::new()),
        })
    }

    /// Stores a new task in `Queued` state and returns its id.
    ///
    /// Validation of the spec happens before this call, at the service seam;
    /// the registry accepts whatever it is given.
    pub fn create(&self, spec: SearchSpec) -> TaskId {
        let task_id = TaskId::new();
        let entry = TaskEntry {
            spec,
            status: TaskStatus::Queued,
            progress: None,
            result: None,
            error: None,
            created_at: Utc::now(),
        };

        self.tasks.insert(task_id.clone(), entry);
        self.order
            .lock()
            .expect("task order lock poisoned")
            .push(task_id.clone());

        tracing::info!("Created search task {}", task_id.0);
        task_id
    }

    /// Returns a snapshot of the current task state.
    pub fn get(&self, task_id: &TaskId) -> Option<TaskEntry> {
        self.tasks.get(task_id).map(|entry| entry.value().clone())
    }

    /// Lists all known tasks in creation order.
    pub fn list(&self) -> Vec<TaskSummary> {
        let order = self.order.lock().expect("task order lock poisoned");
        order
            .iter()
            .filter_map(|task_id| {
                self.tasks.get(task_id).map(|entry| TaskSummary {
                    task_id: task_id.clone(),
                    status: entry.status,
                    created_at: entry.created_at,
                })
            })
            .collect()
    }

    /// Number of tasks known to the process.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Marks a queued task as running.
    ///
    /// Returns `false` when the task is unknown or not in `Queued` state.
    pub fn start(&self, task_id: &TaskId) -> bool {
        match self.tasks.get_mut(task_id) {
            Some(mut entry) => {
                if entry.status != TaskStatus::Queued {
                    tracing::warn!(
                        "Refusing to start task {} in state {:?}",
                        task_id.0,
                        entry.status
                    );
                    return false;
                }
                entry.status = TaskStatus::Running;
                tracing::info!("Task {} is now running", task_id.0);
                true
            }
            None => {
                tracing::warn!("Cannot start unknown task {}", task_id.0);
                false
            }
        }
    }

    /// Overwrites the task's progress message. Ignored once the task is terminal.
    pub fn update_progress(&self, task_id: &TaskId, progress: impl Into<String>) {
        if let Some(mut entry) = self.tasks.get_mut(task_id) {
            if entry.status.is_terminal() {
                return;
            }
            let progress = progress.into();
            tracing::debug!("Task {} progress: {}", task_id.0, progress);
            entry.progress = Some(progress);
        }
    }

    /// Transitions a task to `Completed` and stores its result.
    ///
    /// A no-op when the task is already terminal, so a late or duplicated
    /// orchestrator write can never overwrite a finished task.
    pub fn complete(&self, task_id: &TaskId, result: SearchResult) {
        if let Some(mut entry) = self.tasks.get_mut(task_id) {
            if entry.status.is_terminal() {
                tracing::warn!(
                    "Ignoring complete() on terminal task {} ({:?})",
                    task_id.0,
                    entry.status
                );
                return;
            }
            entry.status = TaskStatus::Completed;
            entry.result = Some(result);
            tracing::info!("Task {} completed", task_id.0);
        } else {
            tracing::warn!("Cannot complete unknown task {}", task_id.0);
        }
    }

    /// Transitions a task to `Failed` and stores the error description.
    ///
    /// A no-op when the task is already terminal.
    pub fn fail(&self, task_id: &TaskId, error: impl Into<String>) {
        if let Some(mut entry) = self.tasks.get_mut(task_id) {
            if entry.status.is_terminal() {
                tracing::warn!(
                    "Ignoring fail() on terminal task {} ({:?})",
                    task_id.0,
                    entry.status
                );
                return;
            }
            let error = error.into();
            tracing::error!("Task {} failed: {}", task_id.0, error);
            entry.status = TaskStatus::Failed;
            entry.error = Some(error);
        } else {
            tracing::warn!("Cannot fail unknown task {}", task_id.0);
        }
    }
}
