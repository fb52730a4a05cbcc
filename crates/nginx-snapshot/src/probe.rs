//! Status endpoint probing.
//!
//! NGINX Plus `api` candidates are tried first and only count on HTTP 200.
//! Open source `stub_status` candidates count on any HTTP response.

use std::path::Path;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use nginx_snapshot_core::{Result, SnapshotError};

use crate::extract::endpoints::collect_endpoints;
use crate::extract::StatusEndpoints;
use crate::parser::{parse, ParseOptions};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which status module answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// `api` (NGINX Plus)
    Plus,
    /// `stub_status`
    Oss,
}

/// A reachable status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEndpoint {
    pub url: String,
    pub kind: EndpointKind,
}

/// HTTP prober for status endpoint candidates.
#[derive(Clone)]
pub struct StatusProbe {
    http: HttpClient,
}

impl StatusProbe {
    /// Probe with default settings
    pub fn new() -> Result<Self> {
        StatusProbeBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> StatusProbeBuilder {
        StatusProbeBuilder::new()
    }

    /// First reachable endpoint among `candidates`.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::NoReachableEndpoint`] listing every URL tried.
    pub async fn probe(&self, candidates: &StatusEndpoints) -> Result<StatusEndpoint> {
        let mut tried = Vec::new();

        for url in &candidates.plus {
            tried.push(url.clone());
            if self.status(url).await == Some(reqwest::StatusCode::OK) {
                return Ok(StatusEndpoint {
                    url: url.clone(),
                    kind: EndpointKind::Plus,
                });
            }
        }

        for url in &candidates.oss {
            tried.push(url.clone());
            if self.status(url).await.is_some() {
                return Ok(StatusEndpoint {
                    url: url.clone(),
                    kind: EndpointKind::Oss,
                });
            }
        }

        Err(SnapshotError::NoReachableEndpoint { tried })
    }

    /// Response status, or `None` when no HTTP response arrived.
    async fn status(&self, url: &str) -> Option<reqwest::StatusCode> {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                debug!(url, error = %e, "invalid status endpoint URL");
                return None;
            }
        };
        match self.http.get(parsed).send().await {
            Ok(response) => {
                debug!(url, status = %response.status(), "status endpoint answered");
                Some(response.status())
            }
            Err(e) => {
                debug!(url, error = %e, "status endpoint unreachable");
                None
            }
        }
    }
}

/// Builder for [`StatusProbe`]
pub struct StatusProbeBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for StatusProbeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusProbeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nginx-snapshot/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<StatusProbe> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| SnapshotError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(StatusProbe { http })
    }
}

/// Discover status endpoints in the configuration at `config_path` and
/// return the first one that answers.
pub async fn status_api_info(config_path: &Path, timeout: Duration) -> Result<StatusEndpoint> {
    let payload = parse(config_path, &ParseOptions::default())?;
    let candidates = collect_endpoints(&payload)?;
    debug!(
        plus = candidates.plus.len(),
        oss = candidates.oss.len(),
        "status endpoint candidates"
    );
    StatusProbe::builder().timeout(timeout).build()?.probe(&candidates).await
}
