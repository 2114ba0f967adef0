//! Interface to the map collaborator: markers in, hover events out.

use crate::catalog::SensorCatalog;
use crate::models::SensorStub;
use serde::{Deserialize, Serialize};

/// One plotted sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

/// Markers for every positioned sensor; unpositioned sensors are not plotted
pub fn markers<'a>(sensors: impl IntoIterator<Item = &'a SensorStub>) -> Vec<MapMarker> {
    sensors
        .into_iter()
        .filter_map(|sensor| {
            sensor.position.map(|pos| MapMarker {
                id: sensor.id.clone(),
                lon: pos.lon,
                lat: pos.lat,
                label: sensor.name.clone(),
            })
        })
        .collect()
}

pub fn catalog_markers(catalog: &SensorCatalog) -> Vec<MapMarker> {
    markers(catalog.sensors())
}

/// Pointer hover state of the map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(String),
}

/// Style changes the map must apply after a pointer move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverTransition {
    Unchanged,
    Highlight {
        id: String,
        previous: Option<String>,
    },
    Unhighlight(String),
}

impl HoverState {
    /// Feed the marker id under the pointer (if any) into the machine
    pub fn pointer_moved(&mut self, under_pointer: Option<&str>) -> HoverTransition {
        let transition = match (&*self, under_pointer) {
            (HoverState::Hovering(current), Some(id)) if current == id => {
                return HoverTransition::Unchanged;
            }
            (HoverState::Idle, None) => return HoverTransition::Unchanged,
            (HoverState::Idle, Some(id)) => HoverTransition::Highlight {
                id: id.to_string(),
                previous: None,
            },
            (HoverState::Hovering(current), Some(id)) => HoverTransition::Highlight {
                id: id.to_string(),
                previous: Some(current.clone()),
            },
            (HoverState::Hovering(current), None) => HoverTransition::Unhighlight(current.clone()),
        };

        *self = match under_pointer {
            Some(id) => HoverState::Hovering(id.to_string()),
            None => HoverState::Idle,
        };
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    #[test]
    fn test_markers_skip_unpositioned() {
        let mut a = SensorStub::new("urn:s:a");
        a.position = Some(Position::new(1.0, 2.0));
        let b = SensorStub::new("urn:s:b");

        let markers = markers([&a, &b]);
        assert_eq!(
            markers,
            vec![MapMarker {
                id: "urn:s:a".to_string(),
                lon: 1.0,
                lat: 2.0,
                label: "a".to_string(),
            }]
        );
    }

    #[test]
    fn test_hover_state_machine() {
        let mut state = HoverState::default();
        assert_eq!(state.pointer_moved(None), HoverTransition::Unchanged);

        assert_eq!(
            state.pointer_moved(Some("a")),
            HoverTransition::Highlight {
                id: "a".to_string(),
                previous: None
            }
        );
        assert_eq!(state.pointer_moved(Some("a")), HoverTransition::Unchanged);

        assert_eq!(
            state.pointer_moved(Some("b")),
            HoverTransition::Highlight {
                id: "b".to_string(),
                previous: Some("a".to_string())
            }
        );
        assert_eq!(
            state.pointer_moved(None),
            HoverTransition::Unhighlight("b".to_string())
        );
        assert_eq!(state, HoverState::Idle);
    }
}
