//! Audited client for the voting backend API

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::transport::{HttpMethod, HttpTransport, Transport, TransportRequest};
use super::types::{
    AdminVotesResponse, DeviceStats, HealthStatus, ResetResponse, ResultsResponse,
    SubmitVoteResponse, VoteStatus, VoteSubmission,
};
use crate::models::{ActionType, Actor, LogLevel, NewLogEntry};
use crate::services::Store;
use crate::util::{compact_text, is_http_url, normalize_text_option};
use crate::{Error, Result};

/// Token the backend requires before wiping all votes
pub const RESET_VOTES_CONFIRMATION: &str = "RESET_ALL_VOTES";
/// Token the backend requires before forgetting every device identifier
pub const RESET_DEVICES_CONFIRMATION: &str = "RESET_ALL_DEVICES";
/// Per-request timeout unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Validate and normalize a backend base URL (`http(s)://`, no trailing `/`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_text_option(Some(base_url.into())).ok_or_else(|| {
            Error::InvalidInput("backend base URL must not be empty".to_string())
        })?;
        if !is_http_url(&base_url) {
            return Err(Error::InvalidInput(
                "backend base URL must include http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

/// One method per backend capability, each audited in the store
pub struct VotingApiClient<T = HttpTransport> {
    config: ApiConfig,
    transport: T,
    store: Store,
}

impl VotingApiClient<HttpTransport> {
    /// Build a client that talks HTTP using the configured timeout
    pub fn new(config: ApiConfig, store: Store) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, transport, store))
    }
}

impl<T: Transport> VotingApiClient<T> {
    pub const fn with_transport(config: ApiConfig, transport: T, store: Store) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /api/health`
    pub async fn health_check(&self, actor: &Actor) -> Result<HealthStatus> {
        self.request(HttpMethod::Get, "/api/health", None, actor).await
    }

    /// `GET /api/results`
    pub async fn get_results(&self, actor: &Actor) -> Result<ResultsResponse> {
        self.request(HttpMethod::Get, "/api/results", None, actor).await
    }

    /// `GET /api/vote-status/{identifier}`
    pub async fn get_vote_status(&self, identifier: &str, actor: &Actor) -> Result<VoteStatus> {
        let endpoint = format!("/api/vote-status/{}", urlencoding::encode(identifier));
        self.request(HttpMethod::Get, &endpoint, None, actor).await
    }

    /// `POST /api/vote`
    pub async fn submit_vote(
        &self,
        submission: &VoteSubmission,
        actor: &Actor,
    ) -> Result<SubmitVoteResponse> {
        let data = serde_json::to_value(submission)?;
        self.request(HttpMethod::Post, "/api/vote", Some(data), actor).await
    }

    /// `GET /api/admin/votes`
    pub async fn get_all_votes(&self, actor: &Actor) -> Result<AdminVotesResponse> {
        self.request(HttpMethod::Get, "/api/admin/votes", None, actor).await
    }

    /// `POST /api/admin/reset`; `confirm` must be [`RESET_VOTES_CONFIRMATION`]
    pub async fn reset_votes(&self, confirm: &str, actor: &Actor) -> Result<ResetResponse> {
        require_confirmation(confirm, RESET_VOTES_CONFIRMATION)?;
        let data = json!({ "confirm": confirm });
        self.request(HttpMethod::Post, "/api/admin/reset", Some(data), actor).await
    }

    /// `POST /api/admin/reset-devices`; `confirm` must be [`RESET_DEVICES_CONFIRMATION`]
    pub async fn reset_devices(&self, confirm: &str, actor: &Actor) -> Result<ResetResponse> {
        require_confirmation(confirm, RESET_DEVICES_CONFIRMATION)?;
        let data = json!({ "confirm": confirm });
        self.request(HttpMethod::Post, "/api/admin/reset-devices", Some(data), actor).await
    }

    /// `GET /api/admin/devices`
    pub async fn get_device_stats(&self, actor: &Actor) -> Result<DeviceStats> {
        self.request(HttpMethod::Get, "/api/admin/devices", None, actor).await
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Option<Value>,
        actor: &Actor,
    ) -> Result<R> {
        let url = self.config.url(endpoint);

        self.store
            .record(
                NewLogEntry::new(
                    LogLevel::Info,
                    ActionType::ApiCall,
                    format!("{method} {endpoint}"),
                )
                .with_details(json!({ "url": url, "data": data }))
                .with_actor(actor),
            )
            .await;

        let outcome = self.exchange(method, &url, data.clone()).await;
        match outcome {
            Ok((status_code, response, decoded)) => {
                self.store
                    .record(
                        NewLogEntry::new(
                            LogLevel::Success,
                            ActionType::ApiCall,
                            format!("API call successful: {method} {endpoint}"),
                        )
                        .with_details(json!({ "status_code": status_code, "response": response }))
                        .with_actor(actor),
                    )
                    .await;
                Ok(decoded)
            }
            Err(detail) => {
                let message = format!("API request failed: {method} {endpoint} - {detail}");
                tracing::error!("{message}");
                self.store
                    .record(
                        NewLogEntry::new(LogLevel::Error, ActionType::ApiCall, message.clone())
                            .with_details(json!({ "error": detail, "url": url, "data": data }))
                            .with_actor(actor),
                    )
                    .await;
                Err(Error::Backend(message))
            }
        }
    }

    /// Perform the request and decode it, describing any failure as text.
    async fn exchange<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Value>,
    ) -> std::result::Result<(u16, Value, R), String> {
        let response = self
            .transport
            .send(TransportRequest {
                method,
                url: url.to_string(),
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(describe_status(response.status, &response.body));
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|error| format!("invalid JSON response: {error}"))?;
        let decoded = R::deserialize(&value)
            .map_err(|error| format!("unexpected response shape: {error}"))?;
        Ok((response.status, value, decoded))
    }
}

fn require_confirmation(provided: &str, expected: &str) -> Result<()> {
    if provided == expected {
        Ok(())
    } else {
        Err(Error::ConfirmationRequired(format!(
            "expected confirmation token {expected}"
        )))
    }
}

fn describe_status(status: u16, body: &str) -> String {
    let body = compact_text(body);
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}
