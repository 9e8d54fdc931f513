//! Service Configuration
//!
//! Central place for portal endpoints, the default country set, and tuning knobs
//! (page size, timeouts, retries). Every value has a sensible default and can be
//! overridden through environment variables, so deployments never need a config file.

use std::path::PathBuf;
use std::time::Duration;

/// Country and region codes accepted by the portal, with display names for logging.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("BR", "Brazil"),
    ("US", "United States"),
    ("EP", "European Patent Office"),
    ("WO", "PCT International"),
    ("CN", "China"),
    ("JP", "Japan"),
    ("KR", "Korea"),
    ("GB", "United Kingdom"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("IN", "India"),
    ("RU", "Russia"),
];

/// Looks up the display name for a country code.
pub fn country_name(code: &str) -> Option<&'static str> {
    COUNTRY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Connection settings for the external patent search portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal, no trailing slash.
    pub base_url: String,
    /// Path of the REST search endpoint.
    pub search_path: String,
    /// Path of the REST detail endpoint.
    pub detail_path: String,
    /// Path of the login endpoint used for authenticated sessions.
    pub login_path: String,
    /// Number of hits requested per page.
    pub page_size: usize,
    /// Timeout applied to every portal request.
    pub request_timeout: Duration,
    /// Attempts per portal request before the error is surfaced.
    pub max_retries: usize,
    /// Portal account, required only for authenticated sessions.
    pub username: Option<String>,
    /// Portal password, required only for authenticated sessions.
    pub password: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://patentscope.wipo.int".to_string(),
            search_path: "/search/rest/search".to_string(),
            detail_path: "/search/rest/detail".to_string(),
            login_path: "/portal/login".to_string(),
            page_size: 100,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            username: None,
            password: None,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub portal: PortalConfig,
    /// Countries searched when the caller does not filter. Fixed order, so
    /// traversal (and therefore first-seen dedup order) is deterministic.
    pub default_countries: Vec<String>,
    /// How many applicants/inventors the statistics block keeps.
    pub top_n: usize,
    /// When set, completed results are also dumped as JSON under this directory.
    pub results_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            default_countries: ["US", "EP", "WO", "CN", "JP", "KR"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            top_n: 10,
            results_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from defaults plus environment overrides.
    ///
    /// Recognized variables: `PORTAL_BASE_URL`, `PORTAL_PAGE_SIZE`,
    /// `PORTAL_TIMEOUT_SECS`, `PORTAL_MAX_RETRIES`, `PORTAL_USERNAME`,
    /// `PORTAL_PASSWORD`, `DEFAULT_COUNTRIES` (comma separated), `RESULTS_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PORTAL_BASE_URL") {
            config.portal.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(size) = env_parse::<usize>("PORTAL_PAGE_SIZE") {
            config.portal.page_size = size.max(1);
        }
        if let Some(secs) = env_parse::<u64>("PORTAL_TIMEOUT_SECS") {
            config.portal.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(retries) = env_parse::<usize>("PORTAL_MAX_RETRIES") {
            config.portal.max_retries = retries.max(1);
        }
        config.portal.username = std::env::var("PORTAL_USERNAME").ok().filter(|v| !v.is_empty());
        config.portal.password = std::env::var("PORTAL_PASSWORD").ok().filter(|v| !v.is_empty());

        if let Ok(countries) = std::env::var("DEFAULT_COUNTRIES") {
            let parsed: Vec<String> = countries
                .split(',')
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.default_countries = parsed;
            }
        }

        config.results_dir = std::env::var("RESULTS_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid value for {}: {}", name, raw);
                None
            }
        },
        Err(_) => None,
    }
}
