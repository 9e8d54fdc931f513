//! Search Service
//!
//! The submission seam between the HTTP layer and the pipeline: validates the
//! spec, creates the task, and schedules the orchestrator run without blocking
//! the caller.

use super::orchestrator::run_search_task;
use super::types::{SearchSpec, ValidationError};
use crate::config::ServiceConfig;
use crate::registry::store::TaskRegistry;
use crate::registry::types::TaskId;
use crate::source::client::SourceClientFactory;

use std::sync::Arc;

/// Entry point for search submissions.
pub struct SearchService {
    registry: Arc<TaskRegistry>,
    sources: Arc<dyn SourceClientFactory>,
    config: Arc<ServiceConfig>,
}

impl SearchService {
    pub fn new(
        registry: Arc<TaskRegistry>,
        sources: Arc<dyn SourceClientFactory>,
        config: Arc<ServiceConfig>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            sources,
            config,
        })
    }

    /// Validates the spec, creates a queued task, and schedules its run.
    ///
    /// Returns immediately with the task id; the caller polls the registry for
    /// progress and the outcome. An invalid spec creates no task at all.
    pub fn submit(&self, spec: SearchSpec) -> Result<TaskId, ValidationError> {
        spec.validate()?;

        let task_id = self.registry.create(spec.clone());
        self.schedule(task_id.clone(), spec);

        Ok(task_id)
    }

    /// Fire-and-forget scheduling of one orchestrator run.
    ///
    /// Single place that knows the spawning primitive, so the orchestrator
    /// stays agnostic of how it is run. Each run gets its own portal session.
    fn schedule(&self, task_id: TaskId, spec: SearchSpec) {
        let registry = self.registry.clone();
        let session = self.sources.new_session();
        let config = self.config.clone();

        tokio::spawn(async move {
            run_search_task(task_id, spec, registry, session, config).await;
        });
    }
}
