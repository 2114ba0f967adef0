//! In-memory sensor catalog for the active session
//!
//! Holds the enriched sensor records from the latest capabilities fetch and
//! answers lookups, spatial filters and extent calculations over them.

use crate::constants::{EXTENT_MIN_PADDING_DEG, EXTENT_PADDING_RATIO};
use crate::models::{BoundingExtent, SensorStub};
use tracing::debug;

/// Sensor records of one session, replaced wholesale on every refresh
#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    sensors: Vec<SensorStub>,
}

impl SensorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new sensor set, dropping the previous one
    pub fn replace_all(&mut self, sensors: Vec<SensorStub>) {
        debug!(
            "Replacing {} catalog sensors with {}",
            self.sensors.len(),
            sensors.len()
        );
        self.sensors = sensors;
    }

    pub fn sensors(&self) -> &[SensorStub] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Look up a sensor by its procedure id
    pub fn get(&self, id: &str) -> Option<&SensorStub> {
        self.sensors.iter().find(|sensor| sensor.id == id)
    }

    /// Sensors with a resolved position inside `bbox` (inclusive).
    ///
    /// Sensors without a position never match, whatever the box.
    pub fn filter_by_spatial_box(&self, bbox: &BoundingExtent) -> Vec<&SensorStub> {
        self.sensors
            .iter()
            .filter(|sensor| sensor.position.is_some_and(|pos| bbox.contains(&pos)))
            .collect()
    }

    /// Number of sensors with a resolved position
    pub fn positioned_count(&self) -> usize {
        self.sensors
            .iter()
            .filter(|sensor| sensor.position.is_some())
            .count()
    }
}

/// Padded bounding box over all resolved positions.
///
/// Each axis is widened by 10% of its span on both sides, or by one degree
/// when the span is zero. `None` when no sensor has a position.
pub fn compute_extent_from_positions(sensors: &[SensorStub]) -> Option<BoundingExtent> {
    let mut positions = sensors.iter().filter_map(|sensor| sensor.position);
    let first = positions.next()?;

    let mut tight = BoundingExtent::from_corners(first, first);
    for pos in positions {
        tight.min_lon = tight.min_lon.min(pos.lon);
        tight.max_lon = tight.max_lon.max(pos.lon);
        tight.min_lat = tight.min_lat.min(pos.lat);
        tight.max_lat = tight.max_lat.max(pos.lat);
    }

    let lon_pad = padding(tight.max_lon - tight.min_lon);
    let lat_pad = padding(tight.max_lat - tight.min_lat);

    Some(BoundingExtent {
        min_lon: tight.min_lon - lon_pad,
        min_lat: tight.min_lat - lat_pad,
        max_lon: tight.max_lon + lon_pad,
        max_lat: tight.max_lat + lat_pad,
    })
}

fn padding(span: f64) -> f64 {
    let pad = span * EXTENT_PADDING_RATIO;
    if pad == 0.0 { EXTENT_MIN_PADDING_DEG } else { pad }
}
