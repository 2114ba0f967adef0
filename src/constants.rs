//! Application constants for the SOS explorer
//!
//! XML namespaces of the SOS 1.0 family of schemas, request defaults and
//! the fixed values used when normalising responses.

// =============================================================================
// XML Namespaces
// =============================================================================

pub mod ns {
    pub const SOS: &str = "http://www.opengis.net/sos/1.0";
    pub const GML: &str = "http://www.opengis.net/gml";
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    pub const SWE: &str = "http://www.opengis.net/swe/1.0.1";
}

// =============================================================================
// Request Defaults
// =============================================================================

/// Service name sent with every request
pub const SERVICE_NAME: &str = "SOS";

/// Protocol version sent with every request
pub const SERVICE_VERSION: &str = "1.0.0";

/// Offering used for GetObservation requests
pub const DEFAULT_OFFERING: &str = "temporary";

/// Output format requested from DescribeSensor
pub const SENSOR_ML_OUTPUT_FORMAT: &str = r#"text/xml;subtype="sensorML/1.0.1""#;

/// Response format requested from GetObservation
pub const OBSERVATION_RESPONSE_FORMAT: &str = "text/xml";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on DescribeSensor requests in flight during enrichment
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Environment variable overriding the configured server URL
pub const SERVER_URL_ENV: &str = "SOS_SERVER_URL";

// =============================================================================
// Response Normalisation
// =============================================================================

pub const DEFAULT_TOKEN_SEPARATOR: &str = ",";
pub const DEFAULT_BLOCK_SEPARATOR: &str = "@";

/// Property label used when a response does not name its phenomenon
pub const DEFAULT_PROPERTY_LABEL: &str = "Observation";

/// Fraction of an axis span added on both sides of a computed extent
pub const EXTENT_PADDING_RATIO: f64 = 0.1;

/// Padding in degrees for an axis whose span is zero
pub const EXTENT_MIN_PADDING_DEG: f64 = 1.0;

pub const NO_DATA_MESSAGE: &str = "No observation data available";
