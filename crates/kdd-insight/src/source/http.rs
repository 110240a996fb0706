//! Remote analytics service reached over HTTP.
//!
//! Every endpoint is a `GET {base_url}/{path}` returning a JSON object.
//! Transport errors, non-success statuses and undecodable bodies all surface
//! as [`AnalyticsError::FetchFailure`].

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::DataSource;
use crate::error::{AnalyticsError, Result};
use crate::payload::Endpoint;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default timeout for API requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "KDD_INSIGHT_API_URL";

/// Configuration for the HTTP source.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSourceConfig {
    /// Base URL the endpoint paths are appended to.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpSourceConfig {
    pub fn builder() -> HttpSourceConfigBuilder {
        HttpSourceConfigBuilder::default()
    }

    /// Defaults, with the base URL taken from [`BASE_URL_ENV`] when set.
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        builder.build()
    }
}

/// Builder for [`HttpSourceConfig`].
#[derive(Default)]
pub struct HttpSourceConfigBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpSourceConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn build(self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self
                .base_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Fetches endpoint payloads from a remote analytics service.
///
/// # Example
///
/// ```rust,ignore
/// use kdd_insight::source::{DataSource, HttpSource, HttpSourceConfig};
///
/// let source = HttpSource::new(HttpSourceConfig::from_env())?;
/// let overview = source.fetch(Endpoint::Overview).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    config: HttpSourceConfig,
    client: Client,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Full URL of `endpoint`.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path()
        )
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        let url = self.url(endpoint);
        let failure = |reason: String| {
            warn!("GET {} failed: {}", url, reason);
            AnalyticsError::fetch_failure(endpoint.path(), reason)
        };

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("service responded with {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| failure(format!("invalid JSON body: {}", e)))
    }
}
