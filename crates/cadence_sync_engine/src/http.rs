//! HTTP transport over reqwest.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use async_trait::async_trait;
use cadence_sync_protocol::{PullResponse, PushRequest, PushResponse};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// HTTPS/JSON transport to the sync server.
///
/// The session rides along as an HttpOnly cookie set by the external
/// magic-link auth flow; the client keeps a cookie store and never sees
/// the token itself. A 401 maps to [`SyncError::Auth`], which the sync
/// client treats as "not authenticated" rather than a failure.
#[derive(Debug)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport against the given server base URL.
    ///
    /// # Errors
    ///
    /// Returns a fatal transport error if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|error| SyncError::transport_fatal(error.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Creates a transport over an existing client, e.g. one sharing the
    /// app's cookie store.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> SyncResult<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::Auth);
        }
        if !status.is_success() {
            // 5xx and anything else unexpected: retried on the next
            // natural trigger.
            return Err(SyncError::transport_retryable(format!(
                "server returned {status}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|error| SyncError::Protocol(error.to_string()))
    }
}

#[async_trait]
impl SyncTransport for HttpTransport {
    async fn push(&self, request: &PushRequest) -> SyncResult<PushResponse> {
        let response = self
            .client
            .post(format!("{}/sync/push", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|error| SyncError::transport_retryable(error.to_string()))?;
        Self::decode(response).await
    }

    async fn pull(&self, since: Option<&str>) -> SyncResult<PullResponse> {
        let mut builder = self.client.get(format!("{}/sync/pull", self.base_url));
        if let Some(since) = since {
            builder = builder.query(&[("since", since)]);
        }
        let response = builder
            .send()
            .await
            .map_err(|error| SyncError::transport_retryable(error.to_string()))?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let transport = HttpTransport::new("https://sync.example.com/").unwrap();
        assert_eq!(transport.base_url(), "https://sync.example.com");

        let transport = HttpTransport::new("https://sync.example.com").unwrap();
        assert_eq!(transport.base_url(), "https://sync.example.com");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_retryable_error() {
        // Discard port on loopback; the connection is refused immediately.
        let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
        let err = transport.pull(None).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
