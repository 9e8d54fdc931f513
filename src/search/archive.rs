//! Result Archiving
//!
//! Optional JSON dump of completed results. Each task gets its own directory
//! named after the search term and a task id prefix; the summary file carries
//! the full `SearchResult` including statistics.
//!
//! Archiving failures are reported to the caller but must never fail the task.

use super::types::SearchResult;
use crate::registry::types::TaskId;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SUMMARY_FILE: &str = "summary_with_stats.json";

/// Replaces everything outside `[A-Za-z0-9._-]` so the term is a safe
/// directory name component.
fn sanitize_term(term: &str) -> String {
    let cleaned: String = term
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "search".to_string()
    } else {
        cleaned
    }
}

/// Writes the result summary under `<base>/<term>_<id-prefix>/` and returns
/// the summary file path.
pub fn write_summary(base: &Path, task_id: &TaskId, result: &SearchResult) -> Result<PathBuf> {
    let id_prefix: String = task_id.0.chars().take(8).collect();
    let dir = base.join(format!(
        "{}_{}",
        sanitize_term(&result.search_info.term),
        id_prefix
    ));

    fs::create_dir_all(&dir)
        .with_context(|| format!("creating archive directory {}", dir.display()))?;

    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(result).context("serializing result summary")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!("Archived search result to {}", path.display());
    Ok(path)
}
