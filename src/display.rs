//! Human-readable rendering of sensors and observation series.

use crate::constants::NO_DATA_MESSAGE;
use crate::models::{BoundingExtent, ObservationSeries, SensorStub};
use colored::*;

/// Decimal degrees as `D° M' S.SS" H`
pub fn decimal_to_dms(decimal: f64, is_latitude: bool) -> String {
    let abs = decimal.abs();
    let degrees = abs.floor();
    let minutes = ((abs - degrees) * 60.0).floor();
    let seconds = (abs - degrees - minutes / 60.0) * 3600.0;

    let direction = match (is_latitude, decimal >= 0.0) {
        (true, true) => 'N',
        (true, false) => 'S',
        (false, true) => 'E',
        (false, false) => 'W',
    };

    format!("{}° {}' {:.2}\" {}", degrees, minutes, seconds, direction)
}

/// Multi-line summary shown when hovering a sensor
pub fn sensor_summary(sensor: &SensorStub) -> String {
    let mut lines = vec![sensor.name.bold().to_string()];
    if !sensor.description.is_empty() {
        lines.push(sensor.description.italic().to_string());
    }
    match sensor.position {
        Some(pos) => {
            lines.push(format!("{}", "Location:".bright_cyan()));
            lines.push(format!("  {}", decimal_to_dms(pos.lat, true)));
            lines.push(format!("  {}", decimal_to_dms(pos.lon, false)));
        }
        None => lines.push(format!("{} unknown", "Location:".bright_cyan())),
    }
    lines.push(format!(
        "{} {}",
        "Observed:".bright_cyan(),
        sensor.observed_property_label()
    ));
    lines.join("\n")
}

/// Sensor listing, one line per sensor
pub fn sensor_table(sensors: &[&SensorStub]) -> String {
    let mut out = String::new();
    for sensor in sensors {
        let position = sensor
            .position
            .map(|p| format!("{:>11.6} {:>10.6}", p.lon, p.lat))
            .unwrap_or_else(|| format!("{:>22}", "-"));
        let period = match (&sensor.time_extent.begin, &sensor.time_extent.end) {
            (Some(begin), Some(end)) => format!("{begin} / {end}"),
            (Some(begin), None) => format!("{begin} / ?"),
            (None, Some(end)) => format!("? / {end}"),
            (None, None) => String::new(),
        };
        out.push_str(&format!(
            "{}  {}  {:<20} {}\n",
            position,
            sensor.display_label().bright_white(),
            sensor.observed_property_label(),
            period.dimmed()
        ));
    }
    out
}

pub fn extent_line(extent: &BoundingExtent) -> String {
    format!(
        "lon {:.6} .. {:.6}, lat {:.6} .. {:.6}",
        extent.min_lon, extent.max_lon, extent.min_lat, extent.max_lat
    )
}

/// Observation table with values to two decimals
pub fn observation_table(series: &ObservationSeries) -> String {
    if series.is_empty() {
        return format!("{}\n", NO_DATA_MESSAGE);
    }

    let mut out = format!("{}\n", series.chart_label().bright_green().bold());
    for obs in &series.observations {
        out.push_str(&format!(
            "{}  {:>12.2}  {}\n",
            obs.timestamp.format("%Y-%m-%d %H:%M:%S"),
            obs.value,
            obs.unit
        ));
    }
    out
}

/// Observation series as CSV (`timestamp,value,unit`)
pub fn observation_csv(series: &ObservationSeries) -> String {
    let mut out = String::from("timestamp,value,unit\n");
    for obs in &series.observations {
        out.push_str(&format!(
            "{},{},{}\n",
            obs.timestamp.to_rfc3339(),
            obs.value,
            obs.unit
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Observation, Position};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_decimal_to_dms() {
        assert_eq!(decimal_to_dms(12.5, true), "12° 30' 0.00\" N");
        assert_eq!(decimal_to_dms(-0.25, false), "0° 15' 0.00\" W");
        assert_eq!(decimal_to_dms(-33.5, true), "33° 30' 0.00\" S");
        assert_eq!(decimal_to_dms(4.0, false), "4° 0' 0.00\" E");
    }

    #[test]
    fn test_sensor_summary_mentions_property() {
        colored::control::set_override(false);
        let mut sensor = SensorStub::new("urn:s:station-1");
        sensor.position = Some(Position::new(5.5, 52.25));
        sensor.observed_property = Some("urn:ogc:def:phenomenon:wind_speed".to_string());

        let summary = sensor_summary(&sensor);
        assert!(summary.starts_with("station-1"));
        assert!(summary.contains("52° 15' 0.00\" N"));
        assert!(summary.contains("Observed: wind_speed"));
    }

    #[test]
    fn test_empty_series_message() {
        let series = ObservationSeries {
            property_label: "Observation".to_string(),
            unit: String::new(),
            observations: vec![],
        };
        assert_eq!(observation_table(&series), "No observation data available\n");
    }

    #[test]
    fn test_observation_csv() {
        let series = ObservationSeries {
            property_label: "air temperature".to_string(),
            unit: "degC".to_string(),
            observations: vec![Observation {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                value: 12.5,
                unit: "degC".to_string(),
            }],
        };
        assert_eq!(
            observation_csv(&series),
            "timestamp,value,unit\n2024-01-01T00:00:00+00:00,12.5,degC\n"
        );
    }
}
