//! GetObservation (O&M 1.0) parsing of `swe:DataArray` text blocks.
//!
//! Records are split by the block separator and tokens by the token
//! separator declared in `swe:TextBlock`. The first token of a record is the
//! time, the second the value; anything else in a record is ignored.

use super::coordinates::parse_finite;
use super::time::parse_timestamp;
use super::{descendants_named, first_descendant, text_content, xlink_href};
use crate::constants::{
    DEFAULT_BLOCK_SEPARATOR, DEFAULT_PROPERTY_LABEL, DEFAULT_TOKEN_SEPARATOR, ns,
};
use crate::error::{Result, SosError};
use crate::models::{Observation, ObservationSeries, last_segment};
use roxmltree::{Document, Node};
use tracing::debug;

/// Parse a GetObservation response into a time-sorted series.
///
/// A response without a data block is an empty series, not an error.
pub fn parse_observations(xml: &str) -> Result<ObservationSeries> {
    let doc = Document::parse(xml)?;
    let root = doc.root();

    let property_label = property_label(root);

    let Some(data_array) = first_descendant(root, ns::SWE, "DataArray") else {
        debug!("No DataArray in observation response");
        return Ok(empty_series(property_label));
    };

    let (token_separator, block_separator) = separators(data_array);
    let unit = first_descendant(data_array, ns::SWE, "uom")
        .and_then(|uom| uom.attribute("code"))
        .unwrap_or_default()
        .to_string();

    let Some(values) = first_descendant(data_array, ns::SWE, "values") else {
        debug!("DataArray has no values element");
        return Ok(ObservationSeries {
            property_label,
            unit,
            observations: Vec::new(),
        });
    };

    let mut observations = Vec::new();
    let mut skipped = 0usize;
    for block in text_content(values).split(block_separator.as_str()) {
        if block.trim().is_empty() {
            continue;
        }
        match parse_record(block, &token_separator, &unit) {
            Ok(observation) => observations.push(observation),
            Err(e) => {
                skipped += 1;
                debug!("Skipping record {:?}: {}", block.trim(), e);
            }
        }
    }

    observations.sort_by_key(|obs| obs.timestamp);

    debug!(
        "Parsed {} observations ({} skipped), unit {:?}",
        observations.len(),
        skipped,
        unit
    );

    Ok(ObservationSeries {
        property_label,
        unit,
        observations,
    })
}

fn empty_series(property_label: String) -> ObservationSeries {
    ObservationSeries {
        property_label,
        unit: String::new(),
        observations: Vec::new(),
    }
}

/// Label from the second component of the composite phenomenon: the first
/// is usually the time field, the second the measured quantity.
fn property_label(root: Node) -> String {
    first_descendant(root, ns::SWE, "CompositePhenomenon")
        .and_then(|phenomenon| descendants_named(phenomenon, ns::SWE, "component").nth(1))
        .and_then(xlink_href)
        .map(|href| last_segment(href).replace('-', " "))
        .unwrap_or_else(|| DEFAULT_PROPERTY_LABEL.to_string())
}

fn separators(data_array: Node) -> (String, String) {
    let encoding = first_descendant(data_array, ns::SWE, "TextBlock");
    let attr = |name: &str, default: &str| {
        encoding
            .and_then(|block| block.attribute(name))
            .filter(|sep| !sep.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    (
        attr("tokenSeparator", DEFAULT_TOKEN_SEPARATOR),
        attr("blockSeparator", DEFAULT_BLOCK_SEPARATOR),
    )
}

fn parse_record(block: &str, token_separator: &str, unit: &str) -> Result<Observation> {
    let mut tokens = block.split(token_separator);
    let time = tokens.next().ok_or_else(|| SosError::missing("time token"))?;
    let value = tokens.next().ok_or_else(|| SosError::missing("value token"))?;

    let value = parse_finite(value)?;
    let timestamp = parse_timestamp(time)?;

    Ok(Observation {
        timestamp,
        value,
        unit: unit.to_string(),
    })
}
