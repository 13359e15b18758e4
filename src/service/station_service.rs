//! Station service: ingestion and weather-enriched temporal reads.

use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use tokio::time::timeout;

use crate::config::ServiceConfig;
use crate::domain::{ReconstructedStation, StationReport, Weather};
use crate::error::ServiceError;
use crate::persistence::{PostgresPersistence, SnapshotReceipt};
use crate::upstream::{FeedClient, WeatherClient};

/// Bounds applied to the weather lookups of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentLimits {
    /// Lookups in flight at once.
    pub concurrency: usize,
    /// Per-lookup deadline.
    pub timeout: Duration,
}

impl Default for EnrichmentLimits {
    fn default() -> Self {
        Self {
            concurrency: 16,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Orchestration layer over the snapshot store and upstream sources.
///
/// Stateless coordinator: every operation either pulls the feed into a
/// new snapshot or reads a snapshot back and decorates it with weather.
#[derive(Debug, Clone)]
pub struct StationService {
    store: PostgresPersistence,
    feed: FeedClient,
    weather: Option<WeatherClient>,
    limits: EnrichmentLimits,
}

impl StationService {
    /// Creates a new `StationService`. Without a weather client, reports
    /// carry no weather.
    #[must_use]
    pub fn new(
        store: PostgresPersistence,
        feed: FeedClient,
        weather: Option<WeatherClient>,
        limits: EnrichmentLimits,
    ) -> Self {
        Self {
            store,
            feed,
            weather,
            limits,
        }
    }

    /// Builds the service and its upstream clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if an HTTP client cannot be
    /// built.
    pub fn from_config(
        store: PostgresPersistence,
        config: &ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let feed = FeedClient::new(
            config.feed_url.as_str(),
            Duration::from_secs(config.feed_timeout_secs),
        )?;
        let weather_timeout = Duration::from_secs(config.weather_timeout_secs);
        let weather = match &config.weather_api_key {
            Some(key) => Some(WeatherClient::new(
                config.weather_base_url.as_str(),
                key.as_str(),
                weather_timeout,
            )?),
            None => {
                tracing::warn!("OPEN_WEATHER_APIKEY not set; weather enrichment disabled");
                None
            }
        };

        Ok(Self::new(
            store,
            feed,
            weather,
            EnrichmentLimits {
                concurrency: config.weather_concurrency.max(1),
                timeout: weather_timeout,
            },
        ))
    }

    /// Returns a reference to the snapshot store.
    #[must_use]
    pub const fn store(&self) -> &PostgresPersistence {
        &self.store
    }

    /// Pulls the feed and stores it as a new snapshot.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Upstream`] if the feed cannot be fetched.
    /// - Any snapshot write error from
    ///   [`PostgresPersistence::write_snapshot`].
    pub async fn ingest(&self) -> Result<SnapshotReceipt, ServiceError> {
        let started = Instant::now();
        let doc = self.feed.fetch().await?;
        let fetched_in = started.elapsed();

        let store_started = Instant::now();
        let receipt = self.store.write_snapshot(&doc).await?;

        tracing::info!(
            snapshot_time = %receipt.snapshot_time,
            stations = receipt.stations,
            bikes = receipt.bikes,
            fetch_ms = fetched_in.as_millis() as u64,
            store_ms = store_started.elapsed().as_millis() as u64,
            total_ms = started.elapsed().as_millis() as u64,
            "ingestion finished"
        );
        Ok(receipt)
    }

    /// Every station as of `at`, each with current weather.
    ///
    /// # Errors
    ///
    /// Propagates [`PostgresPersistence::list_stations`] failures. Weather
    /// failures never fail the call.
    pub async fn stations_at(&self, at: &str) -> Result<Vec<StationReport>, ServiceError> {
        let started = Instant::now();
        let stations = self.store.list_stations(at).await?;
        tracing::debug!(
            at,
            stations = stations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stations reconstructed"
        );
        Ok(enrich(self.weather.as_ref(), stations, self.limits).await)
    }

    /// One station, by kiosk id, as of `at`, with current weather.
    ///
    /// # Errors
    ///
    /// Propagates [`PostgresPersistence::get_station`] failures,
    /// including [`ServiceError::NotFound`].
    pub async fn station_at(&self, at: &str, kiosk_id: &str) -> Result<StationReport, ServiceError> {
        let station = self.store.get_station(at, kiosk_id).await?;
        let mut reports = enrich(self.weather.as_ref(), vec![station], self.limits).await;
        reports
            .pop()
            .ok_or_else(|| ServiceError::Internal("enrichment dropped the station".to_string()))
    }
}

/// Attaches current weather to each station.
///
/// Lookups run concurrently, at most `limits.concurrency` at a time, each
/// under its own `limits.timeout`. A failed or timed-out lookup leaves
/// that station's weather empty. Output order matches input order.
pub async fn enrich(
    client: Option<&WeatherClient>,
    stations: Vec<ReconstructedStation>,
    limits: EnrichmentLimits,
) -> Vec<StationReport> {
    let mut reports: Vec<StationReport> = stations.into_iter().map(StationReport::from).collect();
    let Some(client) = client else {
        return reports;
    };
    if reports.is_empty() {
        return reports;
    }

    let started = Instant::now();
    // Owned targets; the lookup futures must not borrow `reports`.
    #[allow(clippy::needless_collect)]
    let targets: Vec<(usize, f64, f64, i32)> = reports
        .iter()
        .enumerate()
        .map(|(index, report)| {
            let (lat, lon) = report.snapshot.position();
            (index, lat, lon, report.snapshot.station_id())
        })
        .collect();

    let lookups: Vec<(usize, Option<Weather>)> = stream::iter(targets)
        .map(|(index, lat, lon, station_id)| async move {
            let weather = match timeout(limits.timeout, client.current(lat, lon)).await {
                Ok(Ok(weather)) => Some(weather),
                Ok(Err(e)) => {
                    tracing::warn!(station_id, error = %e, "weather lookup failed");
                    None
                }
                Err(_) => {
                    tracing::warn!(station_id, "weather lookup timed out");
                    None
                }
            };
            (index, weather)
        })
        .buffer_unordered(limits.concurrency.max(1))
        .collect()
        .await;

    let mut attached = 0_usize;
    for (index, weather) in lookups {
        if let Some(report) = reports.get_mut(index) {
            attached += usize::from(weather.is_some());
            report.weather = weather;
        }
    }

    tracing::debug!(
        stations = reports.len(),
        attached,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "weather enrichment finished"
    );
    reports
}
