//! Portal Data Types
//!
//! Raw records as returned by the portal, the pagination envelope, the optional
//! detail payload, and the error taxonomy the orchestrator dispatches on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unprocessed patent record from a single country/page search call.
///
/// `publication_number` is the identity used for deduplication; the remaining
/// fields are whatever the portal happened to populate for this hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHit {
    pub publication_number: String,
    pub title: String,
    pub publication_date: String,
    pub applicants: Vec<String>,
    pub inventors: Vec<String>,
    pub application_number: Option<String>,
    pub abstract_text: Option<String>,
}

/// Result of one search call: the hits on this page and whether more pages exist.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<RawHit>,
    pub has_more_pages: bool,
}

/// Fuller record fetched per patent during detail enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailPayload {
    pub abstract_text: Option<String>,
    pub description: Option<String>,
    pub claims: Vec<String>,
    pub ipc_classifications: Vec<String>,
    pub cpc_classifications: Vec<String>,
    /// Publication numbers of patents citing this one.
    pub cited_by: Vec<String>,
    /// Publication numbers this patent cites.
    pub cites: Vec<String>,
}

/// Errors raised by the portal access layer.
///
/// The orchestrator uses the variant to decide whether to keep trying other
/// countries/pages or abort the task.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The portal was unreachable, timed out, or answered with a server error.
    #[error("portal transport error: {0}")]
    Transport(String),
    /// The portal answered, but the payload had none of the expected structure.
    #[error("unparseable portal response: {0}")]
    Parse(String),
    /// The session is not (or no longer) authenticated.
    #[error("portal authentication required: {0}")]
    AuthRequired(String),
    /// The portal throttled us.
    #[error("portal rate limit hit: {0}")]
    RateLimited(String),
}

impl SourceError {
    /// Short kind label used in progress and error strings.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Transport(_) => "transport",
            SourceError::Parse(_) => "parse",
            SourceError::AuthRequired(_) => "auth_required",
            SourceError::RateLimited(_) => "rate_limited",
        }
    }

    /// Whether this error makes every remaining portal call pointless.
    ///
    /// An unusable session affects all countries alike, so the task aborts.
    /// Everything else is scoped to the current country/page and the
    /// orchestrator moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::AuthRequired(_))
    }
}
