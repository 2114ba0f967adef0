//! Session state for one user interacting with one SOS endpoint.
//!
//! The session owns the catalog, the active extent, the selected sensor and
//! the last raw response. Refreshes are tagged with a generation so that a
//! superseded capabilities load can never overwrite a newer one.

use crate::catalog::{SensorCatalog, compute_extent_from_positions};
use crate::client::{SosClient, Transport};
use crate::error::{Result, SosError};
use crate::models::{BoundingExtent, ObservationSeries, SensorStub};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Token identifying one capabilities refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Enriched result of a capabilities load, not yet applied to a session
#[derive(Debug, Clone)]
pub struct LoadedSensors {
    pub sensors: Vec<SensorStub>,
    /// Extent declared by the server's envelope, if any
    pub declared_extent: Option<BoundingExtent>,
    pub raw_capabilities: String,
    pub enrichment_failures: usize,
}

impl LoadedSensors {
    /// Declared extent, or one computed from the enriched positions
    pub fn effective_extent(&self) -> Option<BoundingExtent> {
        self.declared_extent
            .or_else(|| compute_extent_from_positions(&self.sensors))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    catalog: SensorCatalog,
    extent: Option<BoundingExtent>,
    selected: Option<String>,
    last_response: Option<String>,
    enrichment_failures: usize,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub fn extent(&self) -> Option<BoundingExtent> {
        self.extent
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Sensors whose DescribeSensor request failed in the applied refresh
    pub fn enrichment_failures(&self) -> usize {
        self.enrichment_failures
    }

    pub fn selected(&self) -> Option<&SensorStub> {
        self.selected.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// Start a refresh; any refresh started earlier becomes stale
    pub fn begin_refresh(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    /// Apply a completed load if it belongs to the latest refresh.
    ///
    /// Returns `false` and leaves the session untouched for stale results.
    pub fn apply_refresh(&mut self, generation: Generation, loaded: LoadedSensors) -> bool {
        if !self.is_current(generation) {
            warn!(
                "Discarding stale capabilities result (generation {} < {})",
                generation.0, self.generation
            );
            return false;
        }

        self.extent = loaded.effective_extent();
        self.catalog.replace_all(loaded.sensors);
        self.last_response = Some(loaded.raw_capabilities);
        self.enrichment_failures = loaded.enrichment_failures;
        self.selected = None;
        info!(
            "Catalog holds {} sensors ({} positioned)",
            self.catalog.len(),
            self.catalog.positioned_count()
        );
        true
    }

    /// Fetch capabilities, enrich every sensor and apply the result.
    ///
    /// A transport or XML failure leaves the session as it was.
    pub async fn refresh<T: Transport + Sync>(
        &mut self,
        client: &SosClient<T>,
        progress: Option<&ProgressBar>,
    ) -> Result<bool> {
        let generation = self.begin_refresh();
        let loaded = load_sensors(client, progress).await?;
        Ok(self.apply_refresh(generation, loaded))
    }

    /// Mark a sensor as selected and return it
    pub fn select(&mut self, id: &str) -> Result<&SensorStub> {
        if self.catalog.get(id).is_none() {
            return Err(SosError::SensorNotFound { id: id.to_string() });
        }
        self.selected = Some(id.to_string());
        debug!("Selected sensor {}", id);
        self.catalog
            .get(id)
            .ok_or_else(|| SosError::SensorNotFound { id: id.to_string() })
    }

    /// Fetch observations for the selected sensor.
    ///
    /// On failure the previous response is kept.
    pub async fn observations<T: Transport + Sync>(
        &mut self,
        client: &SosClient<T>,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<ObservationSeries> {
        let sensor = self
            .selected()
            .cloned()
            .ok_or(SosError::NoSensorSelected)?;

        let fetched = client.get_observations(&sensor, start, end).await?;
        self.last_response = Some(fetched.raw);
        Ok(fetched.parsed)
    }
}

/// Fetch capabilities and enrich all sensors without touching any session
pub async fn load_sensors<T: Transport + Sync>(
    client: &SosClient<T>,
    progress: Option<&ProgressBar>,
) -> Result<LoadedSensors> {
    let capabilities = client.get_capabilities().await?;
    if let Some(pb) = progress {
        pb.set_length(capabilities.parsed.sensors.len() as u64);
    }

    let (sensors, enrichment_failures) = client
        .enrich_all(capabilities.parsed.sensors, progress)
        .await;

    Ok(LoadedSensors {
        sensors,
        declared_extent: capabilities.parsed.extent,
        raw_capabilities: capabilities.raw,
        enrichment_failures,
    })
}
