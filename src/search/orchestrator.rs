//! Search Orchestrator
//!
//! Drives one task run from `Running` to a terminal state: the sequential
//! country loop with pagination, the global raw-hit limit, progress reporting,
//! deduplication, statistics, and optional detail enrichment.
//!
//! ## Failure Policy
//! - An unusable session (`auth_required`) aborts the task immediately.
//! - Other per-page errors end the current country and the loop moves on.
//! - When every attempted country errored and nothing was collected, the task
//!   fails; partial results gathered before a failure are discarded.
//! - Detail-fetch errors are isolated per record and never fail the task.

use super::archive;
use super::dedup;
use super::types::{PatentRecord, SearchInfo, SearchResult, SearchSpec};
use crate::config::{country_name, ServiceConfig};
use crate::registry::store::TaskRegistry;
use crate::registry::types::TaskId;
use crate::source::client::SourceClient;
use crate::source::types::{RawHit, SourceError};

use chrono::Utc;
use std::sync::Arc;

/// Resolves the working country set: the caller's filter, or the configured
/// default set when absent or empty. Order is preserved as given.
pub fn effective_countries(spec: &SearchSpec, config: &ServiceConfig) -> Vec<String> {
    match &spec.countries {
        Some(countries) if !countries.is_empty() => {
            countries.iter().map(|c| c.trim().to_uppercase()).collect()
        }
        _ => config.default_countries.clone(),
    }
}

fn record_from_hit(hit: RawHit, country: &str) -> PatentRecord {
    PatentRecord {
        publication_number: hit.publication_number,
        title: hit.title,
        publication_date: hit.publication_date,
        source_country: country.to_string(),
        applicants: hit.applicants,
        inventors: hit.inventors,
        application_number: hit.application_number,
        abstract_text: hit.abstract_text,
        detail: None,
    }
}

/// Executes one search task end to end.
///
/// Runs inside its own spawned context; all outcome reporting goes through the
/// registry, nothing is returned to the submitter directly.
pub async fn run_search_task(
    task_id: TaskId,
    spec: SearchSpec,
    registry: Arc<TaskRegistry>,
    source: Arc<dyn SourceClient>,
    config: Arc<ServiceConfig>,
) {
    if !registry.start(&task_id) {
        return;
    }

    tracing::info!("Starting search task {} for term '{}'", task_id.0, spec.term);

    let countries = effective_countries(&spec, &config);
    let authenticated = spec.use_authenticated_session;

    let mut collected: Vec<PatentRecord> = Vec::new();
    let mut failed_countries: Vec<(String, SourceError)> = Vec::new();
    let mut attempted = 0usize;

    for country in &countries {
        // Global cap across the whole loop, not per country.
        if collected.len() >= spec.limit {
            break;
        }
        attempted += 1;

        match country_name(country) {
            Some(name) => tracing::info!("Searching in {} ({})", country, name),
            None => tracing::info!("Searching in {}", country),
        }
        registry.update_progress(&task_id, format!("Searching in {}...", country));

        let mut page = 1u32;
        loop {
            match source.search(&spec.term, country, page, authenticated).await {
                Ok(result_page) => {
                    for hit in result_page.hits {
                        if collected.len() >= spec.limit {
                            break;
                        }
                        collected.push(record_from_hit(hit, country));
                    }
                    if !result_page.has_more_pages || collected.len() >= spec.limit {
                        break;
                    }
                    page += 1;
                }
                Err(e) if e.is_fatal() => {
                    registry.fail(&task_id, format!("search aborted: {}", e));
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        "Search failed in {} on page {}: {} ({})",
                        country,
                        page,
                        e,
                        e.kind()
                    );
                    failed_countries.push((country.clone(), e));
                    break;
                }
            }
        }
    }

    // Nothing collected and every attempted country errored: the portal is
    // effectively unreachable for this task.
    if collected.is_empty() && attempted > 0 && failed_countries.len() == attempted {
        let summary = failed_countries
            .iter()
            .map(|(country, e)| format!("{}: {}", country, e.kind()))
            .collect::<Vec<_>>()
            .join(", ");
        registry.fail(
            &task_id,
            format!("portal search failed for every country ({})", summary),
        );
        return;
    }

    let total_found = collected.len();
    tracing::info!(
        "Task {}: collected {} raw hits across {} countries",
        task_id.0,
        total_found,
        attempted
    );

    registry.update_progress(&task_id, format!("Deduplicating {} hits...", total_found));
    let mut patents = dedup::dedupe_and_merge(collected);
    patents.truncate(spec.limit);

    if spec.fetch_details && !patents.is_empty() {
        let budget = spec.max_details.unwrap_or(patents.len()).min(patents.len());
        registry.update_progress(
            &task_id,
            format!("Retrieving details for {} patents...", budget),
        );

        let mut enriched = 0usize;
        for record in patents.iter_mut().take(budget) {
            match source
                .fetch_detail(&record.publication_number, authenticated)
                .await
            {
                Ok(detail) => {
                    record.detail = Some(detail);
                    enriched += 1;
                }
                Err(e) => {
                    // Partial detail coverage is acceptable; the record keeps
                    // detail = None and the task carries on.
                    tracing::warn!(
                        "Detail fetch failed for {}: {}",
                        record.publication_number,
                        e
                    );
                }
            }
        }
        tracing::info!(
            "Task {}: detail enrichment finished ({}/{} records)",
            task_id.0,
            enriched,
            budget
        );
    }

    let total_unique = patents.len();
    let statistics = dedup::aggregate_stats(&patents, config.top_n);

    registry.update_progress(&task_id, format!("Found {} unique patents", total_unique));

    let mut result = SearchResult {
        search_info: SearchInfo {
            term: spec.term.clone(),
            countries,
            limit: spec.limit,
            use_authenticated_session: authenticated,
            fetch_details: spec.fetch_details,
            max_details: spec.max_details,
            searched_at: Utc::now(),
        },
        total_found,
        total_unique,
        statistics,
        patents,
        archive_path: None,
    };

    if let Some(dir) = &config.results_dir {
        match archive::write_summary(dir, &task_id, &result) {
            Ok(path) => result.archive_path = Some(path.display().to_string()),
            Err(e) => {
                tracing::warn!("Failed to archive result for task {}: {}", task_id.0, e);
            }
        }
    }

    registry.complete(&task_id, result);
}
