//! Command-line interface components.

use crate::error::{Result, SosError};
use crate::models::{BoundingExtent, Position};
use crate::parser::time::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "sos-explorer")]
#[command(about = "Query an OGC Sensor Observation Service: sensors, metadata and time series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the SOS endpoint (overrides config file and SOS_SERVER_URL)
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors; no progress bar
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List sensors from GetCapabilities, enriched with SensorML metadata
    Capabilities {
        /// Only show sensors inside minLon,minLat,maxLon,maxLat
        #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
        bbox: Option<BboxArg>,
    },

    /// Show parsed SensorML for one procedure
    Describe {
        /// Procedure identifier (URN)
        procedure: String,

        /// Print the raw SensorML document instead
        #[arg(long)]
        raw: bool,
    },

    /// Fetch the observation time series of one procedure
    Observations {
        /// Procedure identifier (URN)
        procedure: String,

        /// Start of the window (defaults to the sensor's first known time)
        #[arg(long, value_parser = parse_time_arg)]
        start: Option<DateTime<Utc>>,

        /// End of the window (defaults to the sensor's last known time)
        #[arg(long, value_parser = parse_time_arg)]
        end: Option<DateTime<Utc>>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// `minLon,minLat,maxLon,maxLat`, corners normalised
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BboxArg(pub BoundingExtent);

impl FromStr for BboxArg {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| SosError::numeric(v.trim()))
            })
            .collect::<Result<Vec<f64>>>()?;

        let [min_lon, min_lat, max_lon, max_lat] = values[..] else {
            return Err(SosError::configuration(
                "Please enter valid bounding box coordinates: minLon,minLat,maxLon,maxLat",
            ));
        };

        Ok(Self(BoundingExtent::from_corners(
            Position::new(min_lon, min_lat),
            Position::new(max_lon, max_lat),
        )))
    }
}

fn parse_time_arg(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}
