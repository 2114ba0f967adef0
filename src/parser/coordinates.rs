//! Longitude/latitude extraction from GML and SWE position fragments.
//!
//! Fragments list longitude first. A missing or unparseable position is an
//! expected outcome and yields `None`.

use super::{descendants_named, first_descendant, text_content};
use crate::constants::ns;
use crate::error::{Result, SosError};
use crate::models::Position;
use regex::Regex;
use roxmltree::Node;
use std::sync::OnceLock;
use tracing::debug;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\s+|,").expect("separator pattern is valid"))
}

/// Parse a `lon lat` / `lon,lat` text fragment
pub fn extract_coordinates(fragment: &str) -> Option<Position> {
    match parse_pair(fragment) {
        Ok(position) => Some(position),
        Err(e) => {
            debug!("Could not parse coordinates {:?}: {}", fragment, e);
            None
        }
    }
}

fn parse_pair(fragment: &str) -> Result<Position> {
    let mut tokens = separator()
        .split(fragment.trim())
        .filter(|token| !token.is_empty());

    let lon = parse_finite(tokens.next().ok_or_else(|| SosError::missing("longitude"))?)?;
    let lat = parse_finite(tokens.next().ok_or_else(|| SosError::missing("latitude"))?)?;

    Ok(Position::new(lon, lat))
}

pub(crate) fn parse_finite(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| SosError::numeric(token))
}

/// Resolve a position from a document, trying in order: the first
/// `gml:pos`, the `gml:pos` nested in the first `gml:Point`, the first
/// legacy `gml:coordinates`, and finally a `swe:Vector` with named
/// latitude/longitude coordinates.
pub fn extract_position(node: Node) -> Option<Position> {
    let direct = || first_descendant(node, ns::GML, "pos");
    let in_point = || {
        first_descendant(node, ns::GML, "Point").and_then(|p| first_descendant(p, ns::GML, "pos"))
    };
    let legacy = || first_descendant(node, ns::GML, "coordinates");

    [direct(), in_point(), legacy()]
        .into_iter()
        .flatten()
        .find_map(|fragment| extract_coordinates(&text_content(fragment)))
        .or_else(|| extract_swe_vector(node))
}

fn extract_swe_vector(node: Node) -> Option<Position> {
    let vector = first_descendant(node, ns::SWE, "Vector")?;

    let mut lon = None;
    let mut lat = None;
    for coordinate in descendants_named(vector, ns::SWE, "coordinate") {
        let value = first_descendant(coordinate, ns::SWE, "value")
            .and_then(|v| parse_finite(&text_content(v)).ok());
        match coordinate.attribute("name").map(str::to_ascii_lowercase).as_deref() {
            Some("longitude") | Some("lon") | Some("easting") => lon = lon.or(value),
            Some("latitude") | Some("lat") | Some("northing") => lat = lat.or(value),
            _ => {}
        }
    }

    Some(Position::new(lon?, lat?))
}
