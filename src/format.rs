//! Detection of the RuuviTag broadcast encoding carried by an advertisement.
//!
//! Raw binary formats (manufacturer data, formats 3 and 5) take priority;
//! the deprecated Eddystone-URL style text formats (2 and 4) are a fallback.
//! Detection never fails loudly: anything that is not a recognizable RuuviTag
//! broadcast is simply `None`.

use crate::advertisement::RawAdvertisement;

/// Ruuvi Innovations manufacturer ID as it appears on the wire.
///
/// Bluetooth LE advertisements carry manufacturer IDs little-endian, so the
/// registered company identifier 0x0499 starts the manufacturer block as
/// `99 04`. See: https://github.com/ruuvi/ruuvi-sensor-protocols
pub const RUUVI_MANUFACTURER_ID_BYTES: [u8; 2] = [0x99, 0x04];

/// Ruuvi Innovations manufacturer ID as a number (0x0499).
pub const RUUVI_MANUFACTURER_ID: u16 = 0x0499;

/// Discovery marker of the full RuuviTag URL ("https://ruu.vi/#...").
const URL_MARKER: &str = "ruu.vi/#";

/// Short discovery marker used by shortened RuuviTag URLs.
const SHORT_URL_MARKER: &str = "r/";

/// The broadcast encoding an advertisement was detected to carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectedFormat<'a> {
    /// URL-encoded data (formats 2 and 4): the base64 segment found after a
    /// discovery marker. The actual format code is inside the decoded bytes.
    Url { segment: &'a str },
    /// Raw binary data (format 3 or 5): the full manufacturer block,
    /// vendor ID and format byte included.
    Raw { format: u8, block: &'a [u8] },
}

/// Decide which RuuviTag encoding, if any, an advertisement carries.
///
/// Tries the manufacturer-data path first, then the URL text path. Returns
/// `None` for foreign broadcasters, unknown format codes and undecodable
/// text alike; truncated blocks are left for the decoder to reject.
pub fn detect(adv: &RawAdvertisement) -> Option<DetectedFormat<'_>> {
    detect_raw(adv).or_else(|| detect_url(adv))
}

fn detect_raw(adv: &RawAdvertisement) -> Option<DetectedFormat<'_>> {
    let block = adv.manufacturer_data()?;

    if block.len() < 3 || block[..2] != RUUVI_MANUFACTURER_ID_BYTES {
        return None;
    }

    match block[2] {
        format @ (3 | 5) => Some(DetectedFormat::Raw { format, block }),
        _ => None,
    }
}

fn detect_url(adv: &RawAdvertisement) -> Option<DetectedFormat<'_>> {
    let text = std::str::from_utf8(&adv.payload).ok()?;

    for marker in [URL_MARKER, SHORT_URL_MARKER] {
        if let Some(index) = text.find(marker) {
            let segment = &text[index + marker.len()..];
            return Some(DetectedFormat::Url { segment });
        }
    }

    None
}
