//! GetCapabilities parsing into sensor stubs and an optional extent.
//!
//! Only the first `sos:ObservationOffering` is read. Procedures, observed
//! properties and features of interest are parallel lists; when a property
//! or feature is missing at a procedure's index the first one is shared.

use super::coordinates::extract_coordinates;
use super::{
    descendant_text, descendants_named, first_descendant, required_descendant, text_content,
    xlink_href, xlink_title,
};
use crate::constants::ns;
use crate::error::{Result, SosError};
use crate::models::{BoundingExtent, Capabilities, SensorStub, TimeExtent};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

/// Parse a GetCapabilities response.
///
/// A document without an offering yields no sensors and no extent. Only
/// malformed XML is an error.
pub fn parse_capabilities(xml: &str) -> Result<Capabilities> {
    let doc = Document::parse(xml)?;

    let Some(offering) = first_descendant(doc.root(), ns::SOS, "ObservationOffering") else {
        debug!("No ObservationOffering in capabilities document");
        return Ok(Capabilities::default());
    };

    let extent = match parse_envelope(offering) {
        Ok(extent) => Some(extent),
        Err(e) => {
            debug!("No usable envelope in offering: {}", e);
            None
        }
    };

    let time_extent = parse_offering_period(offering);

    let procedures: Vec<Node> = descendants_named(offering, ns::SOS, "procedure").collect();
    let properties: Vec<Node> = descendants_named(offering, ns::SOS, "observedProperty").collect();
    let features: Vec<Node> = descendants_named(offering, ns::SOS, "featureOfInterest").collect();

    let mut sensors = Vec::with_capacity(procedures.len());
    for (i, procedure) in procedures.iter().enumerate() {
        let Some(id) = href_or_text(*procedure) else {
            warn!("Skipping procedure {} without an identifier", i);
            continue;
        };

        let property = properties.get(i).or_else(|| properties.first());
        let feature = features.get(i).or_else(|| features.first());

        let mut sensor = SensorStub::new(id);
        sensor.observed_property = property.and_then(|p| href_or_text(*p));
        sensor.observed_property_title = property
            .and_then(|p| xlink_title(*p))
            .map(str::to_string);
        sensor.feature_of_interest = feature.and_then(|f| xlink_href(*f)).map(str::to_string);
        sensor.time_extent = time_extent.clone();
        sensors.push(sensor);
    }

    debug!(
        "Parsed {} procedures ({} properties, {} features)",
        sensors.len(),
        properties.len(),
        features.len()
    );

    Ok(Capabilities { sensors, extent })
}

fn parse_envelope(offering: Node) -> Result<BoundingExtent> {
    let envelope = required_descendant(offering, ns::GML, "Envelope")?;
    let lower = required_descendant(envelope, ns::GML, "lowerCorner")?;
    let upper = required_descendant(envelope, ns::GML, "upperCorner")?;

    let corner = |node: Node| {
        let text = text_content(node);
        extract_coordinates(&text).ok_or_else(|| SosError::numeric(text.trim()))
    };

    Ok(BoundingExtent::from_corners(corner(lower)?, corner(upper)?))
}

fn parse_offering_period(offering: Node) -> TimeExtent {
    match first_descendant(offering, ns::GML, "TimePeriod") {
        Some(period) => TimeExtent {
            begin: descendant_text(period, ns::GML, "beginPosition"),
            end: descendant_text(period, ns::GML, "endPosition"),
        },
        None => TimeExtent::default(),
    }
}

/// `xlink:href` of the element, falling back to its text content
fn href_or_text(node: Node) -> Option<String> {
    xlink_href(node).map(str::to_string).or_else(|| {
        let text = text_content(node);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    fn capabilities(offering_body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sos:Capabilities xmlns:sos="http://www.opengis.net/sos/1.0"
                  xmlns:gml="http://www.opengis.net/gml"
                  xmlns:xlink="http://www.w3.org/1999/xlink">
  <sos:Contents>
    <sos:ObservationOfferingList>
      <sos:ObservationOffering gml:id="temporary">
        {offering_body}
      </sos:ObservationOffering>
    </sos:ObservationOfferingList>
  </sos:Contents>
</sos:Capabilities>"#
        )
    }

    #[test]
    fn test_no_offering() {
        let xml = r#"<sos:Capabilities xmlns:sos="http://www.opengis.net/sos/1.0"><sos:Contents/></sos:Capabilities>"#;
        let parsed = parse_capabilities(xml).unwrap();
        assert!(parsed.sensors.is_empty());
        assert!(parsed.extent.is_none());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(parse_capabilities("<sos:Capabilities").is_err());
    }

    #[test]
    fn test_procedures_with_shared_property() {
        let xml = capabilities(
            r#"<gml:boundedBy><gml:Envelope>
                 <gml:lowerCorner>4.0 51.0</gml:lowerCorner>
                 <gml:upperCorner>6.0 53.0</gml:upperCorner>
               </gml:Envelope></gml:boundedBy>
               <sos:time><gml:TimePeriod>
                 <gml:beginPosition>2023-01-01T00:00:00Z</gml:beginPosition>
                 <gml:endPosition>2024-01-01T00:00:00Z</gml:endPosition>
               </gml:TimePeriod></sos:time>
               <sos:procedure xlink:href="urn:ogc:object:Sensor:knmi:260"/>
               <sos:procedure xlink:href="urn:ogc:object:Sensor:knmi:344"/>
               <sos:observedProperty xlink:href="urn:ogc:def:phenomenon:OGC:1.0.30:air-temperature"/>
               <sos:featureOfInterest xlink:href="urn:feature:netherlands"/>"#,
        );

        let parsed = parse_capabilities(&xml).unwrap();
        assert_eq!(parsed.sensors.len(), 2);

        let second = &parsed.sensors[1];
        assert_eq!(second.id, "urn:ogc:object:Sensor:knmi:344");
        assert_eq!(second.name, "344");
        assert_eq!(
            second.observed_property.as_deref(),
            Some("urn:ogc:def:phenomenon:OGC:1.0.30:air-temperature")
        );
        assert_eq!(second.feature_of_interest.as_deref(), Some("urn:feature:netherlands"));
        assert_eq!(second.time_extent.begin.as_deref(), Some("2023-01-01T00:00:00Z"));
        assert!(second.position.is_none());

        let extent = parsed.extent.unwrap();
        assert_eq!(
            extent,
            BoundingExtent::from_corners(Position::new(4.0, 51.0), Position::new(6.0, 53.0))
        );
    }

    #[test]
    fn test_positional_properties_and_text_content() {
        let xml = capabilities(
            r#"<sos:procedure xlink:href="urn:a:1"/>
               <sos:procedure xlink:href="urn:a:2"/>
               <sos:observedProperty xlink:href="urn:p:wind"/>
               <sos:observedProperty>urn:p:rain</sos:observedProperty>"#,
        );
        let parsed = parse_capabilities(&xml).unwrap();
        assert_eq!(parsed.sensors[0].observed_property.as_deref(), Some("urn:p:wind"));
        assert_eq!(parsed.sensors[1].observed_property.as_deref(), Some("urn:p:rain"));
        assert!(parsed.sensors[1].feature_of_interest.is_none());
        assert!(parsed.extent.is_none());
    }

    #[test]
    fn test_property_title_used_for_label() {
        let xml = capabilities(
            r#"<sos:procedure xlink:href="urn:a:1"/>
               <sos:procedure xlink:href="urn:a:2"/>
               <sos:observedProperty xlink:href="urn:p:air-temperature" xlink:title="Air temperature"/>"#,
        );
        let parsed = parse_capabilities(&xml).unwrap();
        for sensor in &parsed.sensors {
            assert_eq!(
                sensor.observed_property_title.as_deref(),
                Some("Air temperature")
            );
            assert_eq!(sensor.observed_property_label(), "Air temperature");
        }

        let untitled = capabilities(
            r#"<sos:procedure xlink:href="urn:a:1"/>
               <sos:observedProperty xlink:href="urn:p:air-temperature"/>"#,
        );
        let parsed = parse_capabilities(&untitled).unwrap();
        assert!(parsed.sensors[0].observed_property_title.is_none());
        assert_eq!(parsed.sensors[0].observed_property_label(), "air-temperature");
    }

    #[test]
    fn test_inverted_envelope_is_normalised() {
        let xml = capabilities(
            r#"<gml:Envelope>
                 <gml:lowerCorner>10.0 60.0</gml:lowerCorner>
                 <gml:upperCorner>-10.0 40.0</gml:upperCorner>
               </gml:Envelope>"#,
        );
        let extent = parse_capabilities(&xml).unwrap().extent.unwrap();
        assert!(extent.min_lon <= extent.max_lon);
        assert!(extent.min_lat <= extent.max_lat);
        assert_eq!(extent.min_lon, -10.0);
        assert_eq!(extent.max_lat, 60.0);
    }

    #[test]
    fn test_non_numeric_corner_gives_no_extent() {
        let xml = capabilities(
            r#"<gml:Envelope>
                 <gml:lowerCorner>west south</gml:lowerCorner>
                 <gml:upperCorner>1.0 2.0</gml:upperCorner>
               </gml:Envelope>
               <sos:procedure xlink:href="urn:a:1"/>"#,
        );
        let parsed = parse_capabilities(&xml).unwrap();
        assert!(parsed.extent.is_none());
        assert_eq!(parsed.sensors.len(), 1);
        assert!(parsed.sensors[0].observed_property.is_none());
    }

    #[test]
    fn test_zero_procedures() {
        let xml = capabilities(r#"<sos:observedProperty xlink:href="urn:p:x"/>"#);
        assert!(parse_capabilities(&xml).unwrap().sensors.is_empty());
    }
}
