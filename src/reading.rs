//! Assembled sensor readings and the shared decoding pipeline.
//!
//! A [`Reading`] combines the broadcaster address and signal strength with
//! the decoded sensor fields. The two historical broadcast families keep
//! distinct shapes; consumers branch on the variant rather than probing
//! optional fields to find out what kind of tag they heard.

use crate::advertisement::RawAdvertisement;
use crate::decoder::{self, DecodeError, DecodedFields};
use crate::format::{self, DetectedFormat};
use crate::mac_address::MacAddress;

/// A reading from a tag broadcasting the deprecated URL encoding (format 2/4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrlReading {
    pub mac: MacAddress,
    /// Received signal strength in dBm.
    pub rssi: i16,
    /// Format discriminator (2 or 4).
    pub format: u8,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Atmospheric pressure in Pascals.
    pub pressure: u32,
    /// Tag identifier byte, when the tag broadcasts one.
    pub identifier: Option<u8>,
}

/// A reading from a tag broadcasting a raw binary encoding (format 3/5).
///
/// Fields that format 3 does not broadcast are `None`; both raw formats share
/// this one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub mac: MacAddress,
    /// Received signal strength in dBm.
    pub rssi: i16,
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

/// One decoded observation of a RuuviTag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Url(UrlReading),
    Raw(RawReading),
}

impl Reading {
    /// Combine an address, signal strength and decoded fields into a reading.
    pub fn assemble(mac: MacAddress, rssi: i16, fields: DecodedFields) -> Reading {
        match fields {
            DecodedFields::Url(f) => Reading::Url(UrlReading {
                mac,
                rssi,
                format: f.format,
                humidity: f.humidity,
                temperature: f.temperature,
                pressure: f.pressure,
                identifier: f.identifier,
            }),
            DecodedFields::Raw(f) => Reading::Raw(RawReading {
                mac,
                rssi,
                format: f.format,
                humidity: f.humidity,
                temperature: f.temperature,
                pressure: f.pressure,
                acceleration_x: f.acceleration_x,
                acceleration_y: f.acceleration_y,
                acceleration_z: f.acceleration_z,
                battery_voltage: f.battery_voltage,
                tx_power: f.tx_power,
                movement_counter: f.movement_counter,
                measurement_sequence: f.measurement_sequence,
            }),
        }
    }

    /// Run the full detect → decode → assemble pipeline on one advertisement.
    ///
    /// This is the single decoding path shared by scanning and tracking.
    pub fn from_advertisement(adv: &RawAdvertisement) -> Result<Reading, DecodeError> {
        let fields = match format::detect(adv).ok_or(DecodeError::Unrecognized)? {
            DetectedFormat::Url { segment } => DecodedFields::Url(decoder::decode_url(segment)?),
            DetectedFormat::Raw { format: 3, block } => {
                DecodedFields::Raw(decoder::decode_format_3(block)?)
            }
            DetectedFormat::Raw { block, .. } => {
                DecodedFields::Raw(decoder::decode_format_5(block)?)
            }
        };

        Ok(Reading::assemble(adv.address, adv.rssi, fields))
    }

    /// Broadcaster address.
    pub fn mac(&self) -> MacAddress {
        match self {
            Reading::Url(r) => r.mac,
            Reading::Raw(r) => r.mac,
        }
    }

    /// Received signal strength in dBm.
    pub fn rssi(&self) -> i16 {
        match self {
            Reading::Url(r) => r.rssi,
            Reading::Raw(r) => r.rssi,
        }
    }

    /// Format discriminator (2, 4, 3 or 5).
    pub fn format(&self) -> u8 {
        match self {
            Reading::Url(r) => r.format,
            Reading::Raw(r) => r.format,
        }
    }

    /// Temperature in Celsius.
    pub fn temperature(&self) -> f64 {
        match self {
            Reading::Url(r) => r.temperature,
            Reading::Raw(r) => r.temperature,
        }
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f64 {
        match self {
            Reading::Url(r) => r.humidity,
            Reading::Raw(r) => r.humidity,
        }
    }
}
