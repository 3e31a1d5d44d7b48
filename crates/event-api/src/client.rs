//! Client for probing a running Event API
//!
//! Plays the role of the orchestrator's HTTP probe: a 2xx answer passes,
//! anything else fails.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::handler::{MessageResponse, StatusResponse};

/// Probe kinds and the paths they hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Liveness,
    Readiness,
    Startup,
}

impl ProbeKind {
    pub fn path(&self) -> &'static str {
        match self {
            ProbeKind::Liveness => "/health",
            ProbeKind::Readiness => "/ready",
            ProbeKind::Startup => "/startup",
        }
    }
}

/// Result of a single probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub kind: ProbeKind,
    pub status_code: u16,
    pub passed: bool,
    pub status: Option<String>,
}

/// Event API client
pub struct ProbeClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl ProbeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one probe. Non-2xx answers are an outcome, not an error.
    pub async fn probe(&self, kind: ProbeKind) -> Result<ProbeOutcome, ClientError> {
        let url = format!("{}{}", self.base_url, kind.path());

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body: Option<StatusResponse> = response.json().await.ok();

        Ok(ProbeOutcome {
            kind,
            status_code: status.as_u16(),
            passed: status.is_success(),
            status: body.map(|b| b.status),
        })
    }

    pub async fn fail(&self) -> Result<String, ClientError> {
        self.admin("/fail").await
    }

    pub async fn unready(&self) -> Result<String, ClientError> {
        self.admin("/unready").await
    }

    pub async fn recover(&self) -> Result<String, ClientError> {
        self.admin("/recover").await
    }

    async fn admin(&self, path: &str) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if response.status().is_success() {
            let body: MessageResponse = response
                .json()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()))?;
            Ok(body.message)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::Server {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_passes_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})),
            )
            .mount(&server)
            .await;

        let client = ProbeClient::new(server.uri());
        let outcome = client.probe(ProbeKind::Liveness).await.unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.status.as_deref(), Some("healthy"));
    }

    #[tokio::test]
    async fn test_probe_fails_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ready"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"status": "not ready"})),
            )
            .mount(&server)
            .await;

        let client = ProbeClient::new(format!("{}/", server.uri()));
        let outcome = client.probe(ProbeKind::Readiness).await.unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.status_code, 503);
        assert_eq!(outcome.status.as_deref(), Some("not ready"));
    }

    #[tokio::test]
    async fn test_admin_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recover"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ProbeClient::new(server.uri());
        let err = client.recover().await.unwrap_err();

        assert!(matches!(err, ClientError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let client = ProbeClient::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(200));
        let err = client.probe(ProbeKind::Startup).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_probe_paths() {
        assert_eq!(ProbeKind::Liveness.path(), "/health");
        assert_eq!(ProbeKind::Readiness.path(), "/ready");
        assert_eq!(ProbeKind::Startup.path(), "/startup");
    }
}
