//! SOS Explorer Library
//!
//! A client for OGC Sensor Observation Service (SOS 1.0) endpoints that turns
//! the three XML response schemas into one uniform sensor/observation model.
//!
//! This library provides tools for:
//! - Parsing GetCapabilities documents into sensor stubs and a bounding extent
//! - Enriching sensors from DescribeSensor (SensorML) responses, concurrently
//! - Parsing GetObservation (O&M) data blocks into sorted time series
//! - Holding the session's sensor catalog with spatial filtering
//! - Building map markers and human-readable output for the CLI

pub mod catalog;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod map;
pub mod models;
pub mod parser;
pub mod session;

// Re-export commonly used types
pub use catalog::{SensorCatalog, compute_extent_from_positions};
pub use client::{HttpTransport, SosClient, Transport};
pub use config::SosConfig;
pub use error::{Result, SosError};
pub use models::{BoundingExtent, Observation, ObservationSeries, Position, SensorStub};
pub use session::Session;
