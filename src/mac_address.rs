//! Compact Bluetooth MAC address type.
//!
//! Addresses are stored as a 6-byte array so they can be used directly as
//! `HashMap` keys in the classifier and the per-window dedup map without
//! allocating.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Bluetooth device address as broadcast over the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Errors returned when parsing a MAC address string.
#[derive(Error, Debug, PartialEq)]
pub enum ParseMacError {
    #[error("invalid MAC address '{0}': expected six colon-separated octets")]
    InvalidFormat(String),
    #[error("invalid MAC address octet '{0}'")]
    InvalidOctet(String),
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut count = 0;

        for part in s.split(':') {
            if count == 6 || part.len() != 2 {
                return Err(ParseMacError::InvalidFormat(s.to_string()));
            }
            bytes[count] = u8::from_str_radix(part, 16)
                .map_err(|_| ParseMacError::InvalidOctet(part.to_string()))?;
            count += 1;
        }

        if count != 6 {
            return Err(ParseMacError::InvalidFormat(s.to_string()));
        }

        Ok(MacAddress(bytes))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}
