//! Registry Module Tests
//!
//! Validates the task store and its state machine.
//!
//! ## Test Scopes
//! - **Lifecycle**: Creation defaults, status transitions, terminal stickiness.
//! - **Reads**: Snapshot lookup, insertion-order listing, unknown ids.
//! - **Invariants**: result/error set exactly when the matching terminal state
//!   holds, also under concurrent polling.

#[cfg(test)]
mod tests {
    use crate::registry::store::TaskRegistry;
    use crate::registry::types::{TaskId, TaskStatus};
    use crate::search::types::{SearchInfo, SearchResult, SearchSpec, SearchStats};
    use chrono::Utc;

    fn sample_spec() -> SearchSpec {
        SearchSpec {
            term: "aspirin".to_string(),
            limit: 5,
            countries: Some(vec!["US".to_string()]),
            use_authenticated_session: false,
            fetch_details: false,
            max_details: None,
        }
    }

    fn empty_result(term: &str) -> SearchResult {
        SearchResult {
            search_info: SearchInfo {
                term: term.to_string(),
                countries: vec!["US".to_string()],
                limit: 5,
                use_authenticated_session: false,
                fetch_details: false,
                max_details: None,
                searched_at: Utc::now(),
            },
            total_found: 0,
            total_unique: 0,
            statistics: SearchStats::default(),
            patents: vec![],
            archive_path: None,
        }
    }

    // ============================================================
    // CREATION AND READS
    // ============================================================

    #[test]
    fn test_create_stores_queued_task() {
        let registry = TaskRegistry::new();

        let before = Utc::now();
        let task_id = registry.create(sample_spec());
        let entry = registry.get(&task_id).expect("task should exist");

        assert_eq!(entry.status, TaskStatus::Queued);
        assert!(entry.progress.is_none());
        assert!(entry.result.is_none());
        assert!(entry.error.is_none());
        assert!(entry.created_at >= before);
        assert_eq!(entry.spec.term, "aspirin");
    }

    #[test]
    fn test_task_ids_are_unique() {
        let registry = TaskRegistry::new();

        let id1 = registry.create(sample_spec());
        let id2 = registry.create(sample_spec());

        assert_ne!(id1.0, id2.0);
    }

    #[test]
    fn test_get_unknown_task_returns_none() {
        let registry = TaskRegistry::new();

        assert!(registry.get(&TaskId::new()).is_none());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let registry = TaskRegistry::new();

        let id1 = registry.create(sample_spec());
        let id2 = registry.create(sample_spec());
        let id3 = registry.create(sample_spec());

        let listing = registry.list();

        assert_eq!(registry.len(), 3);
        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].task_id, id1);
        assert_eq!(listing[1].task_id, id2);
        assert_eq!(listing[2].task_id, id3);
    }

    #[test]
    fn test_list_reflects_current_status() {
        let registry = TaskRegistry::new();

        let id1 = registry.create(sample_spec());
        let id2 = registry.create(sample_spec());
        registry.start(&id1);
        registry.start(&id2);
        registry.fail(&id2, "portal unreachable");

        let listing = registry.list();

        assert_eq!(listing[0].status, TaskStatus::Running);
        assert_eq!(listing[1].status, TaskStatus::Failed);
    }

    // ============================================================
    // STATE MACHINE TRANSITIONS
    // ============================================================

    #[test]
    fn test_start_moves_queued_to_running() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());

        assert!(registry.start(&task_id));
        assert_eq!(registry.get(&task_id).unwrap().status, TaskStatus::Running);
    }

    #[test]
    fn test_start_refuses_non_queued_states() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());

        registry.start(&task_id);

        // Already running
        assert!(!registry.start(&task_id));

        registry.complete(&task_id, empty_result("aspirin"));

        // Terminal
        assert!(!registry.start(&task_id));
    }

    #[test]
    fn test_start_unknown_task_returns_false() {
        let registry = TaskRegistry::new();

        assert!(!registry.start(&TaskId::new()));
    }

    #[test]
    fn test_complete_sets_result_and_status() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);
        registry.update_progress(&task_id, "Found 0 unique patents");

        registry.complete(&task_id, empty_result("aspirin"));

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Completed);
        assert!(entry.result.is_some());
        assert!(entry.error.is_none());
        // Progress survives completion
        assert_eq!(entry.progress.as_deref(), Some("Found 0 unique patents"));
    }

    #[test]
    fn test_fail_sets_error_and_status() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);

        registry.fail(&task_id, "portal search failed for every country");

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Failed);
        assert!(entry.result.is_none());
        assert_eq!(
            entry.error.as_deref(),
            Some("portal search failed for every country")
        );
    }

    // ============================================================
    // TERMINAL STICKINESS
    // ============================================================

    #[test]
    fn test_fail_after_complete_is_ignored() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);
        registry.complete(&task_id, empty_result("aspirin"));

        registry.fail(&task_id, "too late");

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Completed);
        assert!(entry.result.is_some());
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_complete_after_fail_is_ignored() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);
        registry.fail(&task_id, "portal unreachable");

        registry.complete(&task_id, empty_result("aspirin"));

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Failed);
        assert!(entry.result.is_none());
        assert!(entry.error.is_some());
    }

    #[test]
    fn test_double_complete_keeps_first_result() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);

        registry.complete(&task_id, empty_result("first"));
        registry.complete(&task_id, empty_result("second"));

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.result.unwrap().search_info.term, "first");
    }

    #[test]
    fn test_progress_updates_ignored_after_terminal() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);
        registry.update_progress(&task_id, "Searching in US...");
        registry.fail(&task_id, "portal unreachable");

        registry.update_progress(&task_id, "should not appear");

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.progress.as_deref(), Some("Searching in US..."));
    }

    #[test]
    fn test_progress_is_last_write_wins() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());
        registry.start(&task_id);

        registry.update_progress(&task_id, "Searching in US...");
        registry.update_progress(&task_id, "Searching in EP...");

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.progress.as_deref(), Some("Searching in EP..."));
    }

    // ============================================================
    // SERIALIZATION
    // ============================================================

    #[test]
    fn test_task_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Queued).unwrap(),
            "\"queued\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_is_terminal() {
        assert!(!TaskStatus::Queued.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    // ============================================================
    // CONCURRENT POLLING
    // ============================================================

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshots_never_torn_under_concurrent_polling() {
        let registry = TaskRegistry::new();
        let task_id = registry.create(sample_spec());

        let writer_registry = registry.clone();
        let writer_id = task_id.clone();
        let writer = tokio::spawn(async move {
            writer_registry.start(&writer_id);
            for i in 0..50 {
                writer_registry.update_progress(&writer_id, format!("step {}", i));
                tokio::task::yield_now().await;
            }
            writer_registry.complete(&writer_id, empty_result("aspirin"));
        });

        // Poll while the writer mutates; every snapshot must satisfy the
        // result/error-iff-terminal invariant.
        let mut last_terminal = false;
        for _ in 0..200 {
            let entry = registry.get(&task_id).unwrap();
            match entry.status {
                TaskStatus::Completed => {
                    assert!(entry.result.is_some());
                    assert!(entry.error.is_none());
                    last_terminal = true;
                }
                TaskStatus::Failed => {
                    assert!(entry.error.is_some());
                    assert!(entry.result.is_none());
                    last_terminal = true;
                }
                _ => {
                    assert!(!last_terminal, "task left a terminal state");
                    assert!(entry.result.is_none());
                    assert!(entry.error.is_none());
                }
            }
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();

        let entry = registry.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Completed);
    }
}
