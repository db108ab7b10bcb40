//! Telemetry feed access.

pub mod fetcher;

pub use fetcher::{parse_snapshot, TelemetryFetcher};
