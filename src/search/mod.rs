//! Search Pipeline Module
//!
//! The core component turning a submitted `SearchSpec` into a `SearchResult`.
//!
//! ## Overview
//! A submission is validated, registered as a task, and handed to a background
//! orchestrator run. The orchestrator drives the portal client per country with
//! pagination, streams human-readable progress into the task, deduplicates the
//! raw hits, aggregates statistics, optionally enriches records with details,
//! and writes the terminal state back into the registry.
//!
//! ## Submodules
//! - **`service`**: Validation, task creation, and fire-and-forget scheduling.
//! - **`orchestrator`**: The per-task search run (country loop, pagination,
//!   failure policy, detail enrichment).
//! - **`dedup`**: Pure deduplication, merge, and statistics aggregation.
//! - **`archive`**: JSON summary dumps for completed results.
//! - **`handlers`**: HTTP request handler for search submission.
//! - **`types`**: Search spec, patent records, statistics, and API DTOs.

pub mod archive;
pub mod dedup;
pub mod handlers;
pub mod orchestrator;
pub mod service;
pub mod types;
