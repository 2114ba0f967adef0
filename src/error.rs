//! Error handling for SOS client operations.
//!
//! Transport failures propagate to the caller. Structural problems inside a
//! response (absent elements, non-numeric tokens) are recovered by the
//! parsers and only surface here for the helpers that detect them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SosError {
    #[error("Network error requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {code} ({url})")]
    HttpStatus { url: String, code: u16 },

    #[error("Malformed XML document: {0}")]
    XmlSyntax(#[from] roxmltree::Error),

    #[error("Expected element not found: {element}")]
    MissingData { element: String },

    #[error("Not a finite number: {value:?}")]
    NumericParse { value: String },

    #[error("Unrecognised timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("No observed property found for sensor {sensor_id}")]
    MissingObservedProperty { sensor_id: String },

    #[error("No sensor selected")]
    NoSensorSelected,

    #[error("Sensor not found: {id}")]
    SensorNotFound { id: String },

    #[error("Invalid time range: start {start} is after end {end}")]
    InvalidTimeRange { start: String, end: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl SosError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn missing(element: impl Into<String>) -> Self {
        Self::MissingData {
            element: element.into(),
        }
    }

    pub fn numeric(value: impl Into<String>) -> Self {
        Self::NumericParse {
            value: value.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the failure came from the transport layer rather than from
    /// interpreting a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, SosError>;
