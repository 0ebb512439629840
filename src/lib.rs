//! `ruuvitag-scanner` library.
//!
//! Decodes RuuviTag BLE sensor beacon broadcasts (the deprecated URL formats
//! 2/4 and the raw binary formats 3/5) into physical-unit readings, and
//! classifies observed addresses so non-RuuviTag broadcasters are learned and
//! skipped. Scanning collapses bursts into one reading per tag per window;
//! tracking delivers every reading as it arrives.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit
//! codes. The core “business logic” lives in [`crate::app`] where it can be
//! tested deterministically with an injected radio + injected output streams.

pub mod advertisement;
pub mod app;
pub mod classifier;
pub mod decoder;
pub mod duration;
pub mod format;
pub mod mac_address;
pub mod output;
pub mod radio;
pub mod reading;
pub mod session;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use advertisement::RawAdvertisement;
pub use classifier::AddressClassifier;
pub use decoder::{DecodeError, DecodedFields, RawFields, UrlFields};
pub use format::{DetectedFormat, detect};
pub use mac_address::MacAddress;
pub use output::OutputFormatter;
pub use radio::{Radio, RadioError, SystemRadio};
pub use reading::{RawReading, Reading, UrlReading};
pub use session::{DeliveryPolicy, ScanSession, TrackSession};
