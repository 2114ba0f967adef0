//! SOS request construction, transport and sensor enrichment.
//!
//! Query strings are built exactly as deployed SOS 1.0 servers expect them.
//! Enrichment issues one DescribeSensor request per sensor with bounded
//! concurrency; a failure for one sensor leaves that stub unchanged and
//! never affects its siblings.

use crate::config::SosConfig;
use crate::error::{Result, SosError};
use crate::models::{Capabilities, ObservationSeries, SensorDetails, SensorStub};
use crate::parser::time::format_event_time;
use crate::parser::{parse_capabilities, parse_observations, parse_sensor_description};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::future::Future;
use tracing::{debug, info, warn};

/// Fetches the body of a URL as text
pub trait Transport {
    /// Fails with `Network` on transport failure and `HttpStatus` on a
    /// non-2xx response.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &SosConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("sos-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SosError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SosError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SosError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| SosError::network(url, e))
    }
}

/// Raw response text alongside its parsed form
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub raw: String,
    pub parsed: T,
}

/// Client for one SOS endpoint
#[derive(Debug, Clone)]
pub struct SosClient<T> {
    transport: T,
    config: SosConfig,
    base_url: String,
}

impl<T: Transport + Sync> SosClient<T> {
    pub fn new(transport: T, config: SosConfig) -> Result<Self> {
        let base_url = config.server_url()?.to_string();
        Ok(Self {
            transport,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &SosConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn capabilities_url(&self) -> String {
        format!(
            "{}?service={}&request=GetCapabilities&version={}",
            self.base_url, self.config.service, self.config.version
        )
    }

    pub fn describe_sensor_url(&self, procedure: &str) -> String {
        format!(
            "{}?service={}&request=DescribeSensor&version={}&procedure={}&outputFormat={}",
            self.base_url,
            self.config.service,
            self.config.version,
            urlencoding::encode(procedure),
            self.config.sensor_ml_output_format
        )
    }

    pub fn observation_url(
        &self,
        procedure: &str,
        observed_property: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> String {
        format!(
            "{}?request=GetObservation&service={}&version={}&offering={}&procedure={}&observedProperty={}&eventTime={}/{}&responseFormat={}",
            self.base_url,
            self.config.service,
            self.config.version,
            self.config.offering,
            urlencoding::encode(procedure),
            urlencoding::encode(observed_property),
            urlencoding::encode(&format_event_time(start)),
            urlencoding::encode(&format_event_time(end)),
            self.config.response_format
        )
    }

    /// Fetch and parse GetCapabilities. Sensors come back unenriched.
    pub async fn get_capabilities(&self) -> Result<Fetched<Capabilities>> {
        info!("Requesting capabilities from {}", self.base_url);
        let raw = self.transport.fetch_text(&self.capabilities_url()).await?;
        let parsed = parse_capabilities(&raw)?;
        info!("Capabilities list {} procedures", parsed.sensors.len());
        Ok(Fetched { raw, parsed })
    }

    /// Fetch and parse the SensorML document of one procedure
    pub async fn describe_sensor(&self, procedure: &str) -> Result<Fetched<SensorDetails>> {
        let raw = self
            .transport
            .fetch_text(&self.describe_sensor_url(procedure))
            .await?;
        let parsed = parse_sensor_description(&raw)?;
        Ok(Fetched { raw, parsed })
    }

    /// Enrich every stub from its DescribeSensor response.
    ///
    /// Output order matches input order. Returns the stubs and the number
    /// of sensors whose enrichment failed.
    pub async fn enrich_all(
        &self,
        sensors: Vec<SensorStub>,
        progress: Option<&ProgressBar>,
    ) -> (Vec<SensorStub>, usize) {
        let limit = self.config.max_concurrent_requests.max(1);

        let results: Vec<(SensorStub, bool)> = stream::iter(sensors)
            .map(|mut sensor| async move {
                let ok = match self.describe_sensor(&sensor.id).await {
                    Ok(fetched) => {
                        sensor.enrich(&fetched.parsed);
                        true
                    }
                    Err(e) => {
                        warn!("Error fetching details for sensor {}: {}", sensor.id, e);
                        false
                    }
                };
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (sensor, ok)
            })
            .buffered(limit)
            .collect()
            .await;

        let failures = results.iter().filter(|(_, ok)| !ok).count();
        if failures > 0 {
            warn!(
                "{} of {} sensors could not be enriched",
                failures,
                results.len()
            );
        }

        (results.into_iter().map(|(sensor, _)| sensor).collect(), failures)
    }

    /// Fetch observations of a sensor's observed property in `[start, end]`
    pub async fn get_observations(
        &self,
        sensor: &SensorStub,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Fetched<ObservationSeries>> {
        let observed_property = sensor
            .observed_property
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SosError::MissingObservedProperty {
                sensor_id: sensor.id.clone(),
            })?;

        if start > end {
            return Err(SosError::InvalidTimeRange {
                start: format_event_time(start),
                end: format_event_time(end),
            });
        }

        let url = self.observation_url(&sensor.id, observed_property, start, end);
        info!("Requesting observations for {}", sensor.id);
        let raw = self.transport.fetch_text(&url).await?;
        let parsed = parse_observations(&raw)?;
        info!(
            "Received {} observations of {}",
            parsed.observations.len(),
            parsed.property_label
        );
        Ok(Fetched { raw, parsed })
    }
}
