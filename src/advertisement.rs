//! Captured BLE advertisement and AD-structure parsing.
//!
//! An advertisement payload is a sequence of AD structures, each a
//! `length` byte followed by an AD type byte and `length - 1` data bytes.
//! The only structure the decoding pipeline cares about is the
//! manufacturer-specific data block (AD type 0xFF).

use crate::mac_address::MacAddress;

/// Bluetooth manufacturer-specific data AD type.
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// A single broadcast frame captured by the radio.
///
/// Owned by the radio adapter; the decoding pipeline only borrows it for the
/// duration of one classification attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAdvertisement {
    /// Broadcaster address.
    pub address: MacAddress,
    /// Received signal strength in dBm.
    pub rssi: i16,
    /// Advertising data: AD structures, or arbitrary bytes for non-conforming
    /// broadcasters.
    pub payload: Vec<u8>,
}

impl RawAdvertisement {
    /// Extract the manufacturer-specific data block from the payload.
    ///
    /// Walks the AD structures and returns the contents of the first
    /// manufacturer-data entry, vendor ID included. Returns `None` when the
    /// payload carries no such block or is not well-formed AD data; that is a
    /// normal outcome for foreign broadcasters, not an error.
    pub fn manufacturer_data(&self) -> Option<&[u8]> {
        let data = &self.payload;
        let mut offset = 0;

        while offset + 2 <= data.len() {
            let len = data[offset] as usize;
            if len == 0 || offset + 1 + len > data.len() {
                return None;
            }

            if data[offset + 1] == AD_TYPE_MANUFACTURER_DATA {
                return Some(&data[offset + 2..offset + 1 + len]);
            }

            offset += 1 + len;
        }

        None
    }
}
