//! Pure decoders for the RuuviTag broadcast encodings.
//!
//! One stateless function per wire format. Raw-format functions take the full
//! manufacturer block (vendor ID and format byte included) and index at fixed
//! offsets from the start of that block; the URL function takes the text
//! segment found after a discovery marker.
//!
//! Offsets, scaling factors and the quirks of the legacy formats are kept
//! bit-exact with the published Ruuvi encodings, including the format 3
//! sign handling where temperatures above 128 encode negative values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Minimum manufacturer block length for format 3 (RAW v1).
pub const FORMAT_3_BLOCK_LEN: usize = 16;

/// Minimum manufacturer block length for format 5 (RAW v2).
pub const FORMAT_5_BLOCK_LEN: usize = 20;

/// Pressure values are broadcast as an offset from 50 kPa.
const PRESSURE_BASE_PA: u32 = 50_000;

/// Errors for data that looked like a RuuviTag broadcast but failed to decode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Manufacturer block shorter than the detected format requires.
    #[error("manufacturer block too short for format {format}: {len} bytes")]
    Truncated { format: u8, len: usize },
    /// URL segment shorter than the 8 base64 characters formats 2/4 need.
    #[error("URL segment too short: {0} bytes")]
    SegmentTooShort(usize),
    /// URL segment is not valid base64.
    #[error("invalid base64 in URL segment: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The advertisement carries no recognizable RuuviTag data at all.
    #[error("no RuuviTag data in advertisement")]
    Unrecognized,
}

/// Fields decoded from a URL-encoded broadcast (formats 2 and 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrlFields {
    /// Format discriminator echoed from the decoded payload (2 or 4).
    pub format: u8,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Atmospheric pressure in Pascals.
    pub pressure: u32,
    /// Optional tag identifier byte trailing the base64 segment.
    pub identifier: Option<u8>,
}

/// Fields decoded from a raw binary broadcast (formats 3 and 5).
///
/// Fields absent from format 3 are `None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFields {
    /// Format discriminator (3 or 5).
    pub format: u8,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Atmospheric pressure in Pascals.
    pub pressure: u32,
    /// Acceleration along X in milli-g.
    pub acceleration_x: i16,
    /// Acceleration along Y in milli-g.
    pub acceleration_y: i16,
    /// Acceleration along Z in milli-g.
    pub acceleration_z: i16,
    /// Battery voltage in millivolts.
    pub battery_voltage: u16,
    /// Transmit power in dBm (format 5 only).
    pub tx_power: Option<i8>,
    /// Movement counter (format 5 only).
    pub movement_counter: Option<u8>,
    /// Measurement sequence number (format 5 only).
    pub measurement_sequence: Option<u16>,
}

/// Result of running one of the per-format decoders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedFields {
    Url(UrlFields),
    Raw(RawFields),
}

fn be_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

fn be_i16(data: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([data[at], data[at + 1]])
}

/// Decode a URL-encoded broadcast segment (formats 2 and 4).
///
/// The first 8 characters are standard base64 for 6 bytes of sensor data; a
/// 9th character, when present, is a single identifier byte carried verbatim.
pub fn decode_url(segment: &str) -> Result<UrlFields, DecodeError> {
    let raw = segment.as_bytes();
    let identifier = raw.get(8).copied();
    let encoded = raw
        .get(..8)
        .ok_or(DecodeError::SegmentTooShort(raw.len()))?;

    let decoded = BASE64.decode(encoded)?;
    if decoded.len() < 6 {
        return Err(DecodeError::SegmentTooShort(decoded.len()));
    }

    Ok(UrlFields {
        format: decoded[0],
        humidity: f64::from(decoded[1]) / 2.0,
        // The sign bit of the integer part is unused in this legacy format.
        temperature: f64::from(decoded[2] & 0x7F) + f64::from(decoded[3]) / 100.0,
        pressure: u32::from(be_u16(&decoded, 4)) + PRESSURE_BASE_PA,
        identifier,
    })
}

/// Decode a format 3 (RAW v1) manufacturer block.
pub fn decode_format_3(block: &[u8]) -> Result<RawFields, DecodeError> {
    if block.len() < FORMAT_3_BLOCK_LEN {
        return Err(DecodeError::Truncated {
            format: 3,
            len: block.len(),
        });
    }

    // Legacy sign encoding: combined values above 128 degrees are negative,
    // fractional part included.
    let mut temperature = f64::from(block[4]) + f64::from(block[5]) / 100.0;
    if temperature > 128.0 {
        temperature = -(temperature - 128.0);
    }

    Ok(RawFields {
        format: 3,
        humidity: f64::from(block[3]) / 2.0,
        temperature,
        pressure: u32::from(be_u16(block, 6)) + PRESSURE_BASE_PA,
        acceleration_x: be_i16(block, 8),
        acceleration_y: be_i16(block, 10),
        acceleration_z: be_i16(block, 12),
        battery_voltage: be_u16(block, 14),
        tx_power: None,
        movement_counter: None,
        measurement_sequence: None,
    })
}

/// Decode a format 5 (RAW v2) manufacturer block.
pub fn decode_format_5(block: &[u8]) -> Result<RawFields, DecodeError> {
    if block.len() < FORMAT_5_BLOCK_LEN {
        return Err(DecodeError::Truncated {
            format: 5,
            len: block.len(),
        });
    }

    // Battery voltage (offset from 1600 mV) and TX power share one 16-bit
    // word: 11 bits voltage, 5 bits power code.
    let power = be_u16(block, 15);
    let battery_voltage = (power >> 5) + 1600;
    let tx_power = ((power & 0x1F) as i8) * 2 - 40;

    Ok(RawFields {
        format: 5,
        humidity: f64::from(be_u16(block, 5)) * 0.0025,
        temperature: f64::from(be_i16(block, 3)) * 0.005,
        pressure: u32::from(be_u16(block, 7)) + PRESSURE_BASE_PA,
        acceleration_x: be_i16(block, 9),
        acceleration_y: be_i16(block, 11),
        acceleration_z: be_i16(block, 13),
        battery_voltage,
        tx_power: Some(tx_power),
        // TODO: byte 18 is shared between the movement counter and the
        // sequence number here, matching the reference implementation; the
        // published format 5 layout puts the counter at byte 17. Revisit once
        // the upstream decoder is corrected.
        movement_counter: Some(block[18]),
        measurement_sequence: Some(be_u16(block, 18)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FORMAT_3_BLOCK, FORMAT_5_BLOCK};

    #[test]
    fn decodes_url_format_2() {
        // 0x02 0x28 0x16 0x32 0x03 0xE8 in base64
        let fields = decode_url("AigWMgPo").unwrap();
        assert_eq!(fields.format, 2);
        assert_eq!(fields.humidity, 20.0);
        assert_eq!(fields.temperature, 22.5);
        assert_eq!(fields.pressure, 51_000);
        assert_eq!(fields.identifier, None);
    }

    #[test]
    fn decodes_url_format_4_with_identifier() {
        // Same readings with a leading 0x04 format byte and a trailing
        // identifier character.
        let fields = decode_url("BCgWMgPoC").unwrap();
        assert_eq!(fields.format, 4);
        assert_eq!(fields.humidity, 20.0);
        assert_eq!(fields.temperature, 22.5);
        assert_eq!(fields.pressure, 51_000);
        assert_eq!(fields.identifier, Some(b'C'));
    }

    #[test]
    fn url_temperature_ignores_high_bit() {
        // 0x02 0x28 0x96 0x32 0x03 0xE8: temperature byte 0x96 has the high
        // bit set; only the low 7 bits (0x16 = 22) count.
        let fields = decode_url("AiiWMgPo").unwrap();
        assert_eq!(fields.temperature, 22.5);
        assert_eq!(fields.humidity, 20.0);
        assert_eq!(fields.pressure, 51_000);
    }

    #[test]
    fn url_identifier_is_raw_not_base64() {
        // Characters past the 8th are not part of the base64 payload.
        let with = decode_url("AigWMgPoZ").unwrap();
        let without = decode_url("AigWMgPo").unwrap();
        assert_eq!(with.identifier, Some(b'Z'));
        assert_eq!(
            (with.humidity, with.temperature, with.pressure),
            (without.humidity, without.temperature, without.pressure)
        );
    }

    #[test]
    fn url_segment_too_short() {
        assert!(matches!(
            decode_url("AigW"),
            Err(DecodeError::SegmentTooShort(4))
        ));
    }

    #[test]
    fn url_segment_invalid_base64() {
        assert!(matches!(decode_url("!!!!!!!!"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn decodes_format_3_reference_block() {
        let fields = decode_format_3(&FORMAT_3_BLOCK).unwrap();
        assert_eq!(fields.format, 3);
        assert_eq!(fields.humidity, 20.0);
        assert_eq!(fields.temperature, 22.5);
        assert_eq!(fields.pressure, 51_000);
        assert_eq!(fields.acceleration_x, 10);
        assert_eq!(fields.acceleration_y, -10);
        assert_eq!(fields.acceleration_z, 0);
        assert_eq!(fields.battery_voltage, 3_100);
        assert_eq!(fields.tx_power, None);
        assert_eq!(fields.movement_counter, None);
        assert_eq!(fields.measurement_sequence, None);
    }

    #[test]
    fn format_3_negative_temperature() {
        let mut block = FORMAT_3_BLOCK;
        // 150 + 0.25 encodes -22.25 degrees.
        block[4] = 150;
        block[5] = 25;
        let fields = decode_format_3(&block).unwrap();
        assert_eq!(fields.temperature, -22.25);
    }

    #[test]
    fn format_3_truncated_block() {
        assert!(matches!(
            decode_format_3(&FORMAT_3_BLOCK[..12]),
            Err(DecodeError::Truncated { format: 3, len: 12 })
        ));
    }

    #[test]
    fn decodes_format_5_reference_block() {
        let fields = decode_format_5(&FORMAT_5_BLOCK).unwrap();
        assert_eq!(fields.format, 5);
        assert_eq!(fields.temperature, 1.0);
        assert_eq!(fields.humidity, 25.0);
        assert_eq!(fields.pressure, 51_000);
        assert_eq!(fields.acceleration_x, 10);
        assert_eq!(fields.acceleration_y, -10);
        assert_eq!(fields.acceleration_z, 0);
        assert_eq!(fields.battery_voltage, 3_000);
        assert_eq!(fields.tx_power, Some(4));
        assert_eq!(fields.movement_counter, Some(7));
        assert_eq!(fields.measurement_sequence, Some(1_834));
    }

    #[test]
    fn format_5_negative_temperature() {
        let mut block = FORMAT_5_BLOCK;
        // -1.0 degrees: -200 * 0.005
        let encoded = (-200i16).to_be_bytes();
        block[3] = encoded[0];
        block[4] = encoded[1];
        let fields = decode_format_5(&block).unwrap();
        assert_eq!(fields.temperature, -1.0);
    }

    #[test]
    fn format_5_power_word_extremes() {
        let mut block = FORMAT_5_BLOCK;
        block[15] = 0xFF;
        block[16] = 0xFF;
        let fields = decode_format_5(&block).unwrap();
        assert_eq!(fields.battery_voltage, 2047 + 1600);
        assert_eq!(fields.tx_power, Some(22));

        block[15] = 0x00;
        block[16] = 0x00;
        let fields = decode_format_5(&block).unwrap();
        assert_eq!(fields.battery_voltage, 1600);
        assert_eq!(fields.tx_power, Some(-40));
    }

    #[test]
    fn format_5_truncated_block() {
        assert!(matches!(
            decode_format_5(&FORMAT_5_BLOCK[..19]),
            Err(DecodeError::Truncated { format: 5, len: 19 })
        ));
    }
}
