//! OpenWeather current-weather client.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::domain::Weather;
use crate::error::ServiceError;

/// Looks up current weather for a coordinate.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Creates a client against `base_url`, authenticating with `api_key`.
    /// Each lookup gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetches the current weather at `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Upstream`] on network failure, a non-2xx
    /// status, or an undecodable body.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<Weather, ServiceError> {
        let url = self.lookup_url(lat, lon)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(format!("weather request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!(
                "weather service returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("weather body is not valid: {e}")))
    }

    fn lookup_url(&self, lat: f64, lon: f64) -> Result<Url, ServiceError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ],
        )
        .map_err(|e| ServiceError::Internal(format!("invalid weather URL: {e}")))
    }
}
