//! HTTP transport seam for the voting backend client

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::util::sanitize;
use crate::{Error, Result};

/// Methods the backend API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON body, sent only for `POST`
    pub body: Option<Value>,
}

/// Raw outcome of a request that reached the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to the backend.
///
/// Implementations return `Err` only when no response was obtained
/// (connection refused, timeout). Status handling belongs to the client.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = std::result::Result<TransportResponse, String>> + Send;
}

/// `reqwest`-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                Error::InvalidInput(format!("failed to build HTTP client: {}", sanitize(&error)))
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, String> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => {
                let body = request.body.unwrap_or(Value::Null);
                self.client.post(&request.url).json(&body)
            }
        };

        let response = builder
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|error| sanitize(&error))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| sanitize(&error))?;
        Ok(TransportResponse { status, body })
    }
}
