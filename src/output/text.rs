//! Plain-text console rendering of readings.

use crate::output::OutputFormatter;
use crate::reading::Reading;

/// Human-readable one-line format.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format(&self, reading: &Reading) -> String {
        format!(
            "MAC: {}, RSSI: {}, Format: {}, Temp: {}, Humid: {}",
            reading.mac(),
            reading.rssi(),
            reading.format(),
            reading.temperature(),
            reading.humidity()
        )
    }
}
