//! HTTP client for the analysis endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::Instrument;
use url::Url;

use isittrue_config::ClientConfig;
use isittrue_types::{AnalysisRequest, AnalysisResponse, AnalysisResult, HealthStatus};

use crate::error::{ClientError, UNKNOWN_ERROR, ValidationError};

/// Analysis endpoint, relative to the server root.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Health endpoint, relative to the server root.
pub const HEALTH_PATH: &str = "/api/health";

/// Something that can analyze a request.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError>;
}

/// HTTP client for `POST /api/analyze`.
///
/// At most one submission is in flight per client; a second concurrent call
/// is rejected with [`ValidationError::Busy`] without touching the network.
pub struct AnalysisClient {
    client: Client,
    analyze_url: Url,
    health_url: Url,
    in_flight: AtomicBool,
}

impl AnalysisClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| ClientError::Transport(format!("invalid server URL '{base_url}': {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ClientError::Transport(format!("invalid server URL '{base_url}': {e}")))
        };
        let analyze_url = join(ANALYZE_PATH)?;
        let health_url = join(HEALTH_PATH)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("isittrue/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            analyze_url,
            health_url,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.server_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }

    /// Whether a submission is currently awaiting its response.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit a request and interpret the response.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        if !request.has_content() {
            return Err(ValidationError::NoContent.into());
        }
        let _guard = InFlight::acquire(&self.in_flight)?;

        let id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analyze", id = %id);
        async {
            tracing::info!("Submitting analysis to {}", self.analyze_url);
            let outcome = self.post(request).await;
            match &outcome {
                Ok(result) => tracing::info!(
                    "Analysis succeeded ({} chars, type: {})",
                    result.result.len(),
                    result.kind.as_deref().unwrap_or("-")
                ),
                Err(e) => tracing::warn!("Analysis failed: {e}"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn post(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        let resp = self
            .client
            .post(self.analyze_url.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        interpret_response(status, &body)
    }

    /// Check `GET /api/health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self.client.get(self.health_url.clone()).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::generic_server(status.as_u16()));
        }
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Transport(format!("invalid health response: {e}")))
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        self.submit(request).await
    }
}

/// Map an HTTP status and body to a result.
///
/// - non-2xx: the body's `error`, else `Server error: <status>`
/// - 2xx with `success: false` or a non-empty `error`: that error
/// - 2xx otherwise: `result` verbatim plus optional `type`
/// - 2xx with an unparsable body: a transport error
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<AnalysisResult, ClientError> {
    let code = status.as_u16();

    if !status.is_success() {
        let message = serde_json::from_slice::<AnalysisResponse>(body)
            .ok()
            .and_then(|r| r.error_message().map(String::from));
        return Err(match message {
            Some(message) => ClientError::Server {
                status: code,
                message,
            },
            None => ClientError::generic_server(code),
        });
    }

    let parsed: AnalysisResponse = serde_json::from_slice(body)
        .map_err(|e| ClientError::Transport(format!("invalid response body: {e}")))?;

    if parsed.is_failure() {
        return Err(ClientError::Server {
            status: code,
            message: parsed
                .error_message()
                .unwrap_or(UNKNOWN_ERROR)
                .to_string(),
        });
    }

    match parsed.result {
        Some(result) => Ok(AnalysisResult {
            result,
            kind: parsed.kind,
        }),
        None => Err(ClientError::Server {
            status: code,
            message: "Response did not contain a result".to_string(),
        }),
    }
}

/// Marks a client busy until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ValidationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ValidationError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
