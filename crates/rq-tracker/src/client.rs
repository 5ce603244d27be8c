//! Request-tracking service client.
//!
//! [`TrackingService`] is the seam the tracker talks through; [`SeerrClient`]
//! implements it against the Overseerr v1 HTTP API, authenticating with the
//! `X-Api-Key` header.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use rq_core::config::TrackingConfig;
use rq_core::{Ack, Error, MediaRef, Result};
use serde::de::DeserializeOwned;

use crate::remote::{
    CreatedRequest, ErrorBody, MediaDetails, RemoteAvailability, RemoteRequest, RequestPage,
    RequestPayload,
};

/// Service name used in errors and logs.
pub const SERVICE: &str = "Overseerr";

/// Operations the tracker needs from the request-tracking service.
#[async_trait::async_trait]
pub trait TrackingService: Send + Sync {
    /// Availability flag for a title. `Ok(None)` when the service has no
    /// record of it.
    async fn media_availability(&self, media: MediaRef) -> Result<Option<RemoteAvailability>>;

    /// The `take` most recently added requests, newest first.
    async fn recent_requests(&self, take: u32) -> Result<Vec<RemoteRequest>>;

    /// Create an acquisition request.
    async fn create_request(&self, payload: &RequestPayload) -> Result<Ack>;

    /// Delete a request by id.
    async fn delete_request(&self, request_id: u64) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SeerrClient
// ---------------------------------------------------------------------------

/// HTTP client for an Overseerr (or Jellyseerr) instance.
#[derive(Debug, Clone)]
pub struct SeerrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SeerrClient {
    /// Build a client from the tracking section of the configuration.
    ///
    /// Both the URL and the API key must be set.
    pub fn new(config: &TrackingConfig) -> Result<Self> {
        config.require()?;
        Ok(Self::with_timeout(
            config.url.as_deref().unwrap_or_default(),
            config.api_key.as_deref().unwrap_or_default(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn with_timeout(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::remote_unavailable(SERVICE, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Status lookup failed").await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::malformed(SERVICE, e))
    }
}

/// Turn a non-success response into [`Error::RemoteRejected`], preferring the
/// message the service put in the body.
async fn rejection(response: Response, fallback: &str) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    tracing::debug!(status, %message, "{SERVICE} rejected request");
    Error::remote_rejected(SERVICE, status, message)
}

#[async_trait::async_trait]
impl TrackingService for SeerrClient {
    async fn media_availability(&self, media: MediaRef) -> Result<Option<RemoteAvailability>> {
        let path = format!("/{}/{}", media.kind.as_str(), media.id);
        let details: MediaDetails = self.get_json(self.client.get(self.url(&path))).await?;
        Ok(details.media_info.map(|info| info.status))
    }

    async fn recent_requests(&self, take: u32) -> Result<Vec<RemoteRequest>> {
        let request = self.client.get(self.url("/request")).query(&[
            ("filter", "all".to_string()),
            ("sort", "added".to_string()),
            ("take", take.to_string()),
        ]);
        let page: RequestPage = self.get_json(request).await?;
        Ok(page.results)
    }

    async fn create_request(&self, payload: &RequestPayload) -> Result<Ack> {
        let response = self
            .send(self.client.post(self.url("/request")).json(payload))
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Request failed").await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::malformed(SERVICE, e))?;
        if body.trim().is_empty() {
            return Ok(Ack { request_id: None });
        }
        let created: CreatedRequest =
            serde_json::from_str(&body).map_err(|e| Error::malformed(SERVICE, e))?;
        Ok(Ack {
            request_id: created.id,
        })
    }

    async fn delete_request(&self, request_id: u64) -> Result<()> {
        let path = format!("/request/{request_id}");
        let response = self.send(self.client.delete(self.url(&path))).await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Failed to cancel request").await);
        }
        Ok(())
    }
}
