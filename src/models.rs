//! Core data structures for SOS sensor metadata and observations.
//!
//! Defines the normalised sensor record produced from capabilities and
//! SensorML responses, the observation time series, and the geographic
//! extent shared by the catalog and the map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longitude/latitude pair in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Known observation period of a sensor, as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExtent {
    pub begin: Option<String>,
    pub end: Option<String>,
}

impl TimeExtent {
    pub fn is_empty(&self) -> bool {
        self.begin.is_none() && self.end.is_none()
    }
}

/// Identity and metadata for one monitored procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStub {
    pub id: String,
    pub name: String,
    /// Empty until enrichment supplies one
    pub description: String,
    pub observed_property: Option<String>,
    /// Human-readable name the server gives `observed_property`
    pub observed_property_title: Option<String>,
    pub feature_of_interest: Option<String>,
    pub position: Option<Position>,
    pub time_extent: TimeExtent,
}

impl SensorStub {
    /// Create a stub with only identity fields set
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = last_segment(&id).to_string();
        Self {
            id,
            name,
            description: String::new(),
            observed_property: None,
            observed_property_title: None,
            feature_of_interest: None,
            position: None,
            time_extent: TimeExtent::default(),
        }
    }

    /// Merge SensorML details into this stub.
    ///
    /// Fields are only replaced by concrete values; an absent detail never
    /// clears what is already known. Returns whether anything changed.
    pub fn enrich(&mut self, details: &SensorDetails) -> bool {
        let before = self.clone();

        if let Some(position) = details.position {
            self.position = Some(position);
        }
        if !details.description.is_empty() {
            self.description = details.description.clone();
        }
        if let Some(property) = details.observed_property.as_ref().filter(|p| !p.is_empty()) {
            // The title names the old property, not this one
            if self.observed_property.as_ref() != Some(property) {
                self.observed_property_title = None;
            }
            self.observed_property = Some(property.clone());
        }
        if let Some(begin) = &details.time_extent.begin {
            self.time_extent.begin = Some(begin.clone());
        }
        if let Some(end) = &details.time_extent.end {
            self.time_extent.end = Some(end.clone());
        }

        *self != before
    }

    /// Short name of the observed phenomenon: the server's title, else the
    /// last URN segment
    pub fn observed_property_label(&self) -> &str {
        if let Some(title) = self.observed_property_title.as_deref() {
            return title;
        }
        self.observed_property
            .as_deref()
            .map(last_segment)
            .unwrap_or_default()
    }

    /// Label used when listing sensors for selection
    pub fn display_label(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.description)
        }
    }
}

/// Fields extracted from one DescribeSensor response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorDetails {
    pub position: Option<Position>,
    pub description: String,
    pub observed_property: Option<String>,
    pub time_extent: TimeExtent,
}

/// A single timestamped measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
}

/// Parsed GetObservation response, sorted ascending by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    pub property_label: String,
    pub unit: String,
    pub observations: Vec<Observation>,
}

impl ObservationSeries {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Axis/legend label, e.g. "air temperature (degC)"
    pub fn chart_label(&self) -> String {
        format!("{} ({})", self.property_label, self.unit)
    }
}

/// Rectangular geographic extent in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingExtent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingExtent {
    /// Build an extent from two corners given in any order
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self {
            min_lon: a.lon.min(b.lon),
            min_lat: a.lat.min(b.lat),
            max_lon: a.lon.max(b.lon),
            max_lat: a.lat.max(b.lat),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, position: &Position) -> bool {
        position.lon >= self.min_lon
            && position.lon <= self.max_lon
            && position.lat >= self.min_lat
            && position.lat <= self.max_lat
    }
}

/// Result of parsing a GetCapabilities document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub sensors: Vec<SensorStub>,
    pub extent: Option<BoundingExtent>,
}

/// Final colon-delimited segment of a URN
pub fn last_segment(urn: &str) -> &str {
    urn.rsplit(':').next().unwrap_or(urn)
}
