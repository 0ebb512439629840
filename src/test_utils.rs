//! Shared fixtures for unit tests.

use crate::advertisement::RawAdvertisement;
use crate::mac_address::MacAddress;

/// A stable MAC address for unit tests.
pub const TEST_MAC: MacAddress = MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// Reference format 3 block: 20.0 %, 22.50 °C, 51000 Pa, accel (10, -10, 0),
/// battery 3100 mV.
pub const FORMAT_3_BLOCK: [u8; 16] = [
    0x99, 0x04, 0x03, 0x28, 0x16, 0x32, 0x03, 0xE8, 0x00, 0x0A, 0xFF, 0xF6, 0x00, 0x00, 0x0C,
    0x1C,
];

/// Reference format 5 block: 1.0 °C, 25.0 %, 51000 Pa, accel (10, -10, 0),
/// battery 3000 mV, tx 4 dBm, movement 7, sequence 1834.
pub const FORMAT_5_BLOCK: [u8; 20] = [
    0x99, 0x04, 0x05, 0x00, 0xC8, 0x27, 0x10, 0x03, 0xE8, 0x00, 0x0A, 0xFF, 0xF6, 0x00, 0x00,
    0xAF, 0x16, 0x05, 0x07, 0x2A,
];

/// Build an advertisement payload from `(ad_type, data)` AD structures.
pub fn advertisement_with_ad_structures(structures: &[(u8, &[u8])]) -> RawAdvertisement {
    let mut payload = Vec::new();
    for (ad_type, data) in structures {
        payload.push((data.len() + 1) as u8);
        payload.push(*ad_type);
        payload.extend_from_slice(data);
    }
    RawAdvertisement {
        address: TEST_MAC,
        rssi: -60,
        payload,
    }
}

/// Wrap a manufacturer block in a minimal advertisement (flags + block).
pub fn wrap_manufacturer_block(block: &[u8]) -> RawAdvertisement {
    advertisement_with_ad_structures(&[(0x01, &[0x06]), (0xFF, block)])
}

pub fn format_3_advertisement(address: MacAddress) -> RawAdvertisement {
    let mut adv = wrap_manufacturer_block(&FORMAT_3_BLOCK);
    adv.address = address;
    adv
}

pub fn format_5_advertisement(address: MacAddress) -> RawAdvertisement {
    let mut adv = wrap_manufacturer_block(&FORMAT_5_BLOCK);
    adv.address = address;
    adv
}

/// Reference format 5 block with the measurement sequence replaced.
pub fn format_5_block_with_sequence(sequence: u16) -> [u8; 20] {
    let mut block = FORMAT_5_BLOCK;
    block[18..20].copy_from_slice(&sequence.to_be_bytes());
    block
}

/// An advertisement whose payload is plain text, as the deprecated URL
/// formats broadcast it.
pub fn url_advertisement(address: MacAddress, text: &str) -> RawAdvertisement {
    RawAdvertisement {
        address,
        rssi: -70,
        payload: text.as_bytes().to_vec(),
    }
}
