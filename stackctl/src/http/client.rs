//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use stack_api::models::ErrorResponse;
use tracing::{debug, error};
use url::Url;

use crate::errors::StackError;

/// HTTP client for the orchestration service
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StackError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StackError::ConfigError(format!("Invalid endpoint {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StackError::ConfigError(format!(
                "Invalid endpoint {}: not a base URL",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for the given path segments, each percent-encoded
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, StackError> {
        let url = self.url(segments);
        debug!("GET {}", url);
        self.send("GET", self.client.get(url)).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, StackError> {
        let url = self.url(segments);
        debug!("POST {}", url);
        self.send("POST", self.client.post(url).json(body)).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, StackError> {
        let url = self.url(segments);
        debug!("PUT {}", url);
        self.send("PUT", self.client.put(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, StackError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let err = error_from_response(response).await;
            error!("HTTP {} failed: {} - {}", method, status, err);
            return Err(err);
        }

        let body = response.json().await?;
        Ok(body)
    }
}

/// Map a non-success response to a rejection or a retryable failure
async fn error_from_response(response: Response) -> StackError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| {
            if !e.code.is_empty() {
                debug!("Service error code {} for {}", e.code, status);
            }
            e.message
        })
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

    if is_retryable_status(status) {
        StackError::TransientQuery(format!("{}: {}", status, message))
    } else {
        StackError::ValidationError(message)
    }
}

/// Throttling, request timeouts and server-side faults are worth retrying
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
