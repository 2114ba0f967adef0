//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then the `SOS_SERVER_URL` environment variable, then CLI overrides
//! applied by the caller.

use crate::constants::{
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_OFFERING, DEFAULT_REQUEST_TIMEOUT_SECS,
    OBSERVATION_RESPONSE_FORMAT, SENSOR_ML_OUTPUT_FORMAT, SERVER_URL_ENV, SERVICE_NAME,
    SERVICE_VERSION,
};
use crate::error::{Result, SosError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Connection and request settings for one SOS endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SosConfig {
    /// Base URL of the SOS endpoint (without query string)
    pub server_url: Option<String>,

    /// `service` request parameter
    pub service: String,

    /// `version` request parameter
    pub version: String,

    /// Offering named in GetObservation requests
    pub offering: String,

    /// `outputFormat` for DescribeSensor
    pub sensor_ml_output_format: String,

    /// `responseFormat` for GetObservation
    pub response_format: String,

    pub request_timeout_secs: u64,

    /// Maximum DescribeSensor requests in flight during enrichment
    pub max_concurrent_requests: usize,
}

impl Default for SosConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            service: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            offering: DEFAULT_OFFERING.to_string(),
            sensor_ml_output_format: SENSOR_ML_OUTPUT_FORMAT.to_string(),
            response_format: OBSERVATION_RESPONSE_FORMAT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl SosConfig {
    /// Default config file location (`<config_dir>/sos-explorer/config.toml`)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sos-explorer").join("config.toml"))
    }

    /// Read settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| SosError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then `config_file` if given, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("Server URL taken from {}", SERVER_URL_ENV);
                config.server_url = Some(url);
            }
        }

        Ok(config)
    }

    /// Set the endpoint URL
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the GetObservation offering
    pub fn with_offering(mut self, offering: impl Into<String>) -> Self {
        self.offering = offering.into();
        self
    }

    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Trimmed server URL, or a configuration error when none is set
    pub fn server_url(&self) -> Result<&str> {
        self.server_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SosError::configuration("Please enter a valid SOS server URL"))
    }

    /// Check settings before any request is made
    pub fn validate(&self) -> Result<()> {
        let url = self.server_url()?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SosError::configuration(format!(
                "Server URL must start with http:// or https://: {url}"
            )));
        }
        if url.contains('?') {
            return Err(SosError::configuration(
                "Server URL must not contain a query string",
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(SosError::configuration(
                "max_concurrent_requests must be at least 1",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(SosError::configuration(
                "request_timeout_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = SosConfig::default();
        assert_eq!(config.service, "SOS");
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.offering, "temporary");
        assert_eq!(config.max_concurrent_requests, 8);
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(SosConfig::default().validate().is_err());
        assert!(
            SosConfig::default()
                .with_server_url("https://sensors.example.org/sos")
                .validate()
                .is_ok()
        );
        assert!(
            SosConfig::default()
                .with_server_url("ftp://sensors.example.org")
                .validate()
                .is_err()
        );
        assert!(
            SosConfig::default()
                .with_server_url("http://x/sos?service=SOS")
                .validate()
                .is_err()
        );
        assert!(
            SosConfig::default()
                .with_server_url("http://x/sos")
                .with_max_concurrent_requests(0)
                .validate()
                .is_err()
        );
        assert!(
            SosConfig::default()
                .with_server_url("http://x/sos")
                .with_request_timeout_secs(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_request_timeout() {
        let config = SosConfig::default().with_request_timeout_secs(5);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(
            SosConfig::default().request_timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_from_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"server_url = "http://localhost:8080/sos""#).unwrap();
        writeln!(file, r#"offering = "weather""#).unwrap();

        let config = SosConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://localhost:8080/sos"));
        assert_eq!(config.offering, "weather");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server_url = [").unwrap();

        match SosConfig::from_file(file.path()) {
            Err(SosError::ConfigParse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected ConfigParse error, got {:?}", other),
        }
    }
}
