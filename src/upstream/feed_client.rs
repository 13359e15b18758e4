//! Station telemetry feed client.

use std::time::Duration;

use reqwest::Client;

use crate::domain::FeedDocument;
use crate::error::ServiceError;

/// Downloads and decodes the station feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Creates a client for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if the HTTP client cannot be
    /// built (e.g. TLS initialisation failure).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Feed URL this client reads from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the current feed document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Upstream`] on network failure, a non-2xx
    /// status, or an undecodable body.
    pub async fn fetch(&self) -> Result<FeedDocument, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(format!("feed request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!(
                "feed returned HTTP {status}"
            )));
        }

        let doc: FeedDocument = response
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("feed body is not valid: {e}")))?;

        tracing::debug!(
            url = %self.url,
            stations = doc.features.len(),
            last_updated = %doc.last_updated,
            "feed downloaded"
        );
        Ok(doc)
    }
}
