use crate::registry::types::{TaskId, TaskStatus};
use crate::source::types::DetailPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 1000;

fn default_limit() -> usize {
    50
}

/// Caller input for a patent search. Immutable once a task is created from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Search term, required and non-empty.
    pub term: String,
    /// Global cap on raw hits examined across all countries.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Country codes to search. None or empty means the default set.
    #[serde(default)]
    pub countries: Option<Vec<String>>,
    /// Use the configured portal account instead of an anonymous session.
    #[serde(default)]
    pub use_authenticated_session: bool,
    /// Fetch the full record for matched patents.
    #[serde(default)]
    pub fetch_details: bool,
    /// Bounds how many unique patents get detail enrichment. Must be <= `limit`.
    #[serde(default)]
    pub max_details: Option<usize>,
}

impl SearchSpec {
    /// Checks the spec at submission time, before any task exists.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.term.trim().is_empty() {
            return Err(ValidationError::EmptyTerm);
        }
        if self.limit < MIN_LIMIT || self.limit > MAX_LIMIT {
            return Err(ValidationError::LimitOutOfRange { limit: self.limit });
        }
        if let Some(max_details) = self.max_details {
            if max_details > self.limit {
                return Err(ValidationError::MaxDetailsExceedsLimit {
                    max_details,
                    limit: self.limit,
                });
            }
        }
        Ok(())
    }
}

/// Rejected search specs. Surfaces synchronously to the submitter; no task is
/// created for an invalid spec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'term' must not be empty")]
    EmptyTerm,
    #[error("'limit' must be between {MIN_LIMIT} and {MAX_LIMIT}, got {limit}")]
    LimitOutOfRange { limit: usize },
    #[error("'max_details' ({max_details}) must not exceed 'limit' ({limit})")]
    MaxDetailsExceedsLimit { max_details: usize, limit: usize },
}

/// One deduplicated patent in the final result set.
///
/// `source_country` is the country whose query first surfaced the record;
/// `detail` stays None unless detail enrichment ran and succeeded for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentRecord {
    pub publication_number: String,
    pub title: String,
    pub publication_date: String,
    pub source_country: String,
    pub applicants: Vec<String>,
    pub inventors: Vec<String>,
    pub application_number: Option<String>,
    pub abstract_text: Option<String>,
    pub detail: Option<DetailPayload>,
}

/// One entry of a top-N frequency ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

/// Aggregate statistics over the unique patent set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Unique records per first-seen source country.
    pub counts_by_country: HashMap<String, usize>,
    /// Unique records per 4-digit publication year. Records with unparseable
    /// dates are absent here but still counted in `total_unique`.
    pub counts_by_year: HashMap<String, usize>,
    pub top_applicants: Vec<NameCount>,
    pub top_inventors: Vec<NameCount>,
}

/// Echo of the effective parameters a completed search ran with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInfo {
    pub term: String,
    /// The countries actually traversed (caller's filter or the default set).
    pub countries: Vec<String>,
    pub limit: usize,
    pub use_authenticated_session: bool,
    pub fetch_details: bool,
    pub max_details: Option<usize>,
    pub searched_at: DateTime<Utc>,
}

/// Final payload of a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub search_info: SearchInfo,
    /// Raw hits collected across countries, before deduplication.
    pub total_found: usize,
    /// Size of the deduplicated (and limit-truncated) set.
    pub total_unique: usize,
    pub statistics: SearchStats,
    /// Unique patents in first-seen order.
    pub patents: Vec<PatentRecord>,
    /// Where the JSON summary was archived, when archiving is configured.
    pub archive_path: Option<String>,
}

/// Response returned immediately after a search submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitSearchResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub message: String,
}

/// Body of client-error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
