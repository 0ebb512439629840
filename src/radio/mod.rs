//! Radio adapter abstraction.
//!
//! The decoding core is driven by a stream of [`RawAdvertisement`] values;
//! where they come from is the radio adapter's business. The `Radio` trait
//! exists so the run loop can be tested with a fake adapter feeding canned
//! advertisements, while the binary uses the raw HCI socket backend.

#[cfg(feature = "hci")]
pub mod hci;

use crate::advertisement::RawAdvertisement;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel buffer size for captured advertisements.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Errors from the radio adapter.
#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
    #[error("no radio backend available (compiled without the 'hci' feature)")]
    NoBackend,
}

/// A source of captured advertisements.
pub trait Radio: Send + Sync {
    /// Begin capturing and return the advertisement stream.
    ///
    /// Capture runs until the returned receiver is dropped or the adapter
    /// stops; the core performs no start/stop bookkeeping of its own.
    fn start_capture(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<RawAdvertisement>, RadioError>> + Send + '_>>;
}

/// The real radio: dispatches to the compiled-in backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRadio;

impl Radio for SystemRadio {
    fn start_capture(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<RawAdvertisement>, RadioError>> + Send + '_>>
    {
        Box::pin(async move {
            #[cfg(feature = "hci")]
            {
                hci::start_capture().await
            }
            #[cfg(not(feature = "hci"))]
            {
                Err(RadioError::NoBackend)
            }
        })
    }
}
