//! DescribeSensor (SensorML 1.0.1) parsing.
//!
//! Every field is extracted independently and falls back to its empty value,
//! so one odd element never costs the others.

use super::coordinates::extract_position;
use super::time::strip_fractional_seconds;
use super::{descendant_text, required_descendant};
use crate::constants::ns;
use crate::error::{Result, SosError};
use crate::models::{SensorDetails, TimeExtent};
use roxmltree::{Document, Node};
use tracing::debug;

/// Parse a SensorML document into the fields used for enrichment
pub fn parse_sensor_description(xml: &str) -> Result<SensorDetails> {
    let doc = Document::parse(xml)?;
    let root = doc.root();

    let details = SensorDetails {
        position: extract_position(root),
        description: descendant_text(root, ns::GML, "description").unwrap_or_default(),
        observed_property: or_log("observed property", quantity_definition(root)),
        time_extent: or_log("time period", time_period(root)).unwrap_or_default(),
    };

    debug!(
        "SensorML fields: position={:?} property={:?} period={:?}",
        details.position, details.observed_property, details.time_extent
    );

    Ok(details)
}

fn or_log<T>(field: &str, result: Result<T>) -> Option<T> {
    result
        .map_err(|e| debug!("SensorML {} unavailable: {}", field, e))
        .ok()
}

fn time_period(root: Node) -> Result<TimeExtent> {
    let period = required_descendant(root, ns::GML, "TimePeriod")?;
    let clean = |local: &str| {
        descendant_text(period, ns::GML, local).map(|t| strip_fractional_seconds(&t).to_string())
    };

    Ok(TimeExtent {
        begin: clean("beginPosition"),
        end: clean("endPosition"),
    })
}

/// `definition` of the first `swe:Quantity`, unqualified or SWE-qualified
fn quantity_definition(root: Node) -> Result<String> {
    let quantity = required_descendant(root, ns::SWE, "Quantity")?;
    quantity
        .attribute("definition")
        .or_else(|| quantity.attribute((ns::SWE, "definition")))
        .map(str::trim)
        .filter(|definition| !definition.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SosError::missing("Quantity@definition"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    const SENSOR_ML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sml:SensorML xmlns:sml="http://www.opengis.net/sensorML/1.0.1"
              xmlns:gml="http://www.opengis.net/gml"
              xmlns:swe="http://www.opengis.net/swe/1.0.1"
              version="1.0.1">
  <sml:member>
    <sml:System gml:id="station-260">
      <gml:description>  De Bilt automatic weather station  </gml:description>
      <sml:capabilities>
        <swe:DataRecord>
          <swe:field name="validTime">
            <swe:TimeRange>
              <gml:TimePeriod>
                <gml:beginPosition>2001-01-01T00:00:00.000+01:00</gml:beginPosition>
                <gml:endPosition>2024-12-31T23:50:00.000+01:00</gml:endPosition>
              </gml:TimePeriod>
            </swe:TimeRange>
          </swe:field>
        </swe:DataRecord>
      </sml:capabilities>
      <sml:position name="stationPosition">
        <gml:Point><gml:pos srsName="EPSG:4326">5.18 52.1</gml:pos></gml:Point>
      </sml:position>
      <sml:outputs>
        <sml:OutputList>
          <sml:output name="temperature">
            <swe:Quantity definition="urn:ogc:def:phenomenon:OGC:1.0.30:air-temperature">
              <swe:uom code="degC"/>
            </swe:Quantity>
          </sml:output>
        </sml:OutputList>
      </sml:outputs>
    </sml:System>
  </sml:member>
</sml:SensorML>"#;

    #[test]
    fn test_full_description() {
        let details = parse_sensor_description(SENSOR_ML).unwrap();
        assert_eq!(details.position, Some(Position::new(5.18, 52.1)));
        assert_eq!(details.description, "De Bilt automatic weather station");
        assert_eq!(
            details.observed_property.as_deref(),
            Some("urn:ogc:def:phenomenon:OGC:1.0.30:air-temperature")
        );
        assert_eq!(details.time_extent.begin.as_deref(), Some("2001-01-01T00:00:00"));
        assert_eq!(details.time_extent.end.as_deref(), Some("2024-12-31T23:50:00"));
    }

    #[test]
    fn test_missing_fields_default_independently() {
        let xml = r#"<sml:SensorML xmlns:sml="http://www.opengis.net/sensorML/1.0.1"
                                   xmlns:gml="http://www.opengis.net/gml"
                                   xmlns:swe="http://www.opengis.net/swe/1.0.1">
            <gml:pos>garbage</gml:pos>
            <swe:Quantity/>
            <gml:description>Only a description</gml:description>
        </sml:SensorML>"#;

        let details = parse_sensor_description(xml).unwrap();
        assert_eq!(details.position, None);
        assert_eq!(details.observed_property, None);
        assert!(details.time_extent.is_empty());
        assert_eq!(details.description, "Only a description");
    }

    #[test]
    fn test_swe_qualified_definition() {
        let xml = r#"<sml:SensorML xmlns:sml="http://www.opengis.net/sensorML/1.0.1"
                                   xmlns:swe="http://www.opengis.net/swe/1.0.1">
            <swe:Quantity swe:definition="urn:p:rain"/>
        </sml:SensorML>"#;
        let details = parse_sensor_description(xml).unwrap();
        assert_eq!(details.observed_property.as_deref(), Some("urn:p:rain"));
        assert_eq!(details.description, "");
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_sensor_description("<sml:SensorML><oops></sml:SensorML>"),
            Err(SosError::XmlSyntax(_))
        ));
    }
}
