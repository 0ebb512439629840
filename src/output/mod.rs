//! Output formatters for decoded readings.
//!
//! The binary renders readings either as plain console text or as InfluxDB
//! line protocol; both go through one trait so the run loop does not care
//! which was picked.

pub mod influxdb;
pub mod text;

use crate::reading::Reading;

/// Converts a reading into one output line.
pub trait OutputFormatter: Send + Sync {
    fn format(&self, reading: &Reading) -> String;
}
