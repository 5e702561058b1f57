//! Request transport: turns a descriptor into a response envelope.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::{FailureCode, FetchFailure},
    protocol::{Method, RequestDescriptor, ResponseEnvelope},
};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Raw body of a successful response.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String, FetchFailure>;

    /// Performs `request` and tags the outcome with it.
    async fn exchange(&self, request: RequestDescriptor) -> ResponseEnvelope {
        match self.fetch(&request).await {
            Ok(body) => ResponseEnvelope::success(request, body),
            Err(failure) => ResponseEnvelope::failure(request, failure),
        }
    }
}

/// Strips trailing slashes so request paths can be appended verbatim.
pub fn normalize_api_base(raw: &str) -> Result<String, TransportError> {
    let base = raw.trim().trim_end_matches('/');
    Url::parse(base).map_err(|source| TransportError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    Ok(base.to_string())
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base: String,
}

impl HttpTransport {
    pub fn new(api_base: &str) -> Result<Self, TransportError> {
        let http = Client::builder().build()?;
        Self::with_client(http, api_base)
    }

    pub fn with_client(http: Client, api_base: &str) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            base: normalize_api_base(api_base)?,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String, FetchFailure> {
        let url = format!("{}{}", self.base, request.path());
        debug!(request_id = request.id.0, %url, "fetching");
        let builder = match request.method() {
            Method::Get => self.http.get(&url),
        };
        let response = builder
            .send()
            .await
            .map_err(|err| FetchFailure::new(FailureCode::Network, err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchFailure::new(FailureCode::Network, err.to_string()))?;
        if !status.is_success() {
            return Err(FetchFailure::http(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
