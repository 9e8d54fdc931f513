//! Portal Client
//!
//! The `SourceClient` contract the orchestrator drives, and the production
//! implementation talking to the portal's REST endpoints.
//!
//! ## Responsibilities
//! - **Sessions**: One client (and cookie jar) per task run; lazy login when the
//!   caller requested an authenticated session.
//! - **Retries**: Transient transport failures are retried with exponential
//!   backoff and jitter before an error is surfaced.
//! - **Extraction**: Lenient parsing of the portal's JSON payloads into
//!   `RawHit`/`DetailPayload`; hits without a publication number are skipped.

use super::types::{DetailPayload, RawHit, SearchPage, SourceError};
use crate::config::PortalConfig;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// The portal operations the search orchestrator depends on.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Runs one search page against the portal.
    async fn search(
        &self,
        term: &str,
        country: &str,
        page: u32,
        authenticated: bool,
    ) -> Result<SearchPage, SourceError>;

    /// Fetches the full record for a single patent.
    async fn fetch_detail(
        &self,
        publication_number: &str,
        authenticated: bool,
    ) -> Result<DetailPayload, SourceError>;
}

/// Creates one fresh portal session per task run.
///
/// Sessions are never shared across tasks, so authenticated state and
/// pagination cursors cannot leak between concurrent searches.
pub trait SourceClientFactory: Send + Sync {
    fn new_session(&self) -> Arc<dyn SourceClient>;
}

/// Factory producing `PortalClient` sessions from the service configuration.
pub struct PortalClientFactory {
    config: Arc<PortalConfig>,
}

impl PortalClientFactory {
    pub fn new(config: Arc<PortalConfig>) -> Arc<Self> {
        Arc::new(Self { config })
    }
}

impl SourceClientFactory for PortalClientFactory {
    fn new_session(&self) -> Arc<dyn SourceClient> {
        Arc::new(PortalClient::new(self.config.clone()))
    }
}

/// Production client for the external patent search portal.
pub struct PortalClient {
    config: Arc<PortalConfig>,
    /// Cookie store enabled so the login session carries across calls.
    http: reqwest::Client,
    /// Guards the lazy login so concurrent calls log in at most once.
    logged_in: tokio::sync::Mutex<bool>,
}

impl PortalClient {
    pub fn new(config: Arc<PortalConfig>) -> Self {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build portal HTTP client");

        Self {
            config,
            http,
            logged_in: tokio::sync::Mutex::new(false),
        }
    }

    /// Logs in once per session when authenticated access was requested.
    async fn ensure_session(&self, authenticated: bool) -> Result<(), SourceError> {
        if !authenticated {
            return Ok(());
        }

        let mut logged_in = self.logged_in.lock().await;
        if *logged_in {
            return Ok(());
        }

        let (username, password) = match (&self.config.username, &self.config.password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => {
                return Err(SourceError::AuthRequired(
                    "authenticated session requested but no portal credentials configured"
                        .to_string(),
                ));
            }
        };

        let url = format!("{}{}", self.config.base_url, self.config.login_path);
        tracing::info!("Logging in to portal as {}", username);

        let response = self
            .http
            .post(&url)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("login request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::AuthRequired(format!(
                "portal login rejected with status {}",
                response.status()
            )));
        }

        *logged_in = true;
        Ok(())
    }

    /// Sends a GET with retry on transport failures.
    ///
    /// Exponential backoff with jitter between attempts; only the final
    /// failure is surfaced.
    async fn get_with_retry(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, SourceError> {
        let attempts = self.config.max_retries;
        let mut delay_ms = 150u64;

        for attempt in 0..attempts {
            let response = self
                .http
                .get(url)
                .query(params)
                .timeout(self.config.request_timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(SourceError::Transport(e.to_string()));
                    }
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(SourceError::Transport("retry attempts exhausted".to_string()))
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, SourceError> {
        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Parse(format!("portal returned invalid JSON: {}", e)))
    }
}

#[async_trait]
impl SourceClient for PortalClient {
    async fn search(
        &self,
        term: &str,
        country: &str,
        page: u32,
        authenticated: bool,
    ) -> Result<SearchPage, SourceError> {
        self.ensure_session(authenticated).await?;

        let url = format!("{}{}", self.config.base_url, self.config.search_path);
        let params = [
            ("query", build_query(term, Some(country))),
            ("page", page.to_string()),
            ("pageSize", self.config.page_size.to_string()),
        ];

        tracing::debug!("Portal search: country={} page={} term={}", country, page, term);

        let response = self.get_with_retry(&url, &params).await?;
        let body = self.read_json(response).await?;

        parse_search_page(&body)
    }

    async fn fetch_detail(
        &self,
        publication_number: &str,
        authenticated: bool,
    ) -> Result<DetailPayload, SourceError> {
        self.ensure_session(authenticated).await?;

        let url = format!("{}{}", self.config.base_url, self.config.detail_path);
        let params = [("docId", publication_number.to_string())];

        tracing::debug!("Portal detail fetch: {}", publication_number);

        let response = self.get_with_retry(&url, &params).await?;
        let body = self.read_json(response).await?;

        parse_detail(&body, publication_number)
    }
}

/// Maps non-success HTTP statuses onto the error taxonomy.
pub(crate) fn classify_status(status: reqwest::StatusCode) -> Option<SourceError> {
    if status.is_success() {
        return None;
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Some(SourceError::RateLimited(format!("portal returned {}", status)));
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Some(SourceError::AuthRequired(format!("portal returned {}", status)));
    }
    Some(SourceError::Transport(format!("portal returned {}", status)))
}

/// Builds the portal's field-coded query string.
///
/// `FP` searches the full patent text; `CTR` restricts to an office of
/// publication.
pub(crate) fn build_query(term: &str, country: Option<&str>) -> String {
    match country {
        Some(country) => format!("FP:({}) AND CTR:{}", term, country),
        None => format!("FP:({})", term),
    }
}

/// Extracts hits and the pagination flag from a portal search response.
///
/// Individual hits missing a publication number are skipped; a payload with
/// no result list at all is a parse error.
pub(crate) fn parse_search_page(body: &Value) -> Result<SearchPage, SourceError> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse("response has no results list".to_string()))?;

    let mut hits = Vec::new();
    for value in results {
        match parse_hit(value) {
            Some(hit) => hits.push(hit),
            None => {
                tracing::debug!("Skipping hit without publication number");
            }
        }
    }

    let has_more_pages = body
        .get("hasMorePages")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(SearchPage {
        hits,
        has_more_pages,
    })
}

fn parse_hit(value: &Value) -> Option<RawHit> {
    let publication_number = string_field(value, "publicationNumber")?;

    Some(RawHit {
        publication_number,
        title: string_field(value, "title").unwrap_or_default(),
        publication_date: string_field(value, "publicationDate").unwrap_or_default(),
        applicants: string_list_field(value, "applicants"),
        inventors: string_list_field(value, "inventors"),
        application_number: string_field(value, "applicationNumber"),
        abstract_text: string_field(value, "abstract"),
    })
}

/// Extracts the detail payload for one patent.
pub(crate) fn parse_detail(
    body: &Value,
    publication_number: &str,
) -> Result<DetailPayload, SourceError> {
    if !body.is_object() {
        return Err(SourceError::Parse(format!(
            "detail response for {} is not an object",
            publication_number
        )));
    }

    Ok(DetailPayload {
        abstract_text: string_field(body, "abstract"),
        description: string_field(body, "description"),
        claims: string_list_field(body, "claims"),
        ipc_classifications: string_list_field(body, "ipcClassifications"),
        cpc_classifications: string_list_field(body, "cpcClassifications"),
        cited_by: string_list_field(body, "citedBy"),
        cites: string_list_field(body, "cites"),
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
