//! Scan and track sessions over a stream of captured advertisements.
//!
//! Both sessions run the same classify → detect → decode pipeline; they
//! differ only in when readings are emitted. [`ScanSession`] collects a
//! bounded window, keeps the last advertisement per address and emits one
//! batch at window close. [`TrackSession`] runs until the advertisement
//! stream ends and hands every decoded reading to a callback immediately.

use crate::advertisement::RawAdvertisement;
use crate::classifier::AddressClassifier;
use crate::mac_address::MacAddress;
use crate::reading::Reading;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};

/// Which reading variants a [`TrackSession`] delivers to its sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Deliver every decoded reading.
    #[default]
    All,
    /// Deliver only raw (format 3/5) readings; URL readings are dropped
    /// without being treated as failures.
    RawOnly,
}

/// One bounded observation window producing at most one reading per address.
///
/// Advertisements from the same address overwrite each other while the window
/// is open; only the last one is decoded when the window closes. Addresses
/// whose final advertisement fails to decode are reported to the classifier
/// and produce nothing.
pub struct ScanSession<'a> {
    classifier: &'a mut AddressClassifier,
}

impl<'a> ScanSession<'a> {
    pub fn new(classifier: &'a mut AddressClassifier) -> Self {
        ScanSession { classifier }
    }

    /// Collect advertisements for `window`, then drain to readings.
    ///
    /// The window closes early if the advertisement stream ends. Readings
    /// are returned in no particular order.
    pub async fn run(
        self,
        adverts: &mut mpsc::Receiver<RawAdvertisement>,
        window: Duration,
    ) -> Vec<Reading> {
        let deadline = Instant::now() + window;
        let mut slots: HashMap<MacAddress, RawAdvertisement> = HashMap::new();

        // Collecting: last write per address wins.
        loop {
            match timeout_at(deadline, adverts.recv()).await {
                Ok(Some(adv)) => {
                    if self.classifier.admit(&adv.address) {
                        slots.insert(adv.address, adv);
                    }
                }
                // Stream ended or window elapsed.
                Ok(None) | Err(_) => break,
            }
        }

        // Draining: decode each slot exactly once.
        let mut readings = Vec::with_capacity(slots.len());
        for (address, adv) in slots {
            match Reading::from_advertisement(&adv) {
                Ok(reading) => readings.push(reading),
                Err(_) => self.classifier.record_failure(address),
            }
        }
        readings
    }
}

/// An unbounded observation stream delivering each reading as it arrives.
///
/// No deduplication: every admitted advertisement that decodes successfully
/// results in one sink invocation. The session ends when the advertisement
/// stream closes or when the sink asks to stop; stopping the stream itself
/// is the radio adapter's business.
pub struct TrackSession<'a> {
    classifier: &'a mut AddressClassifier,
    policy: DeliveryPolicy,
}

impl<'a> TrackSession<'a> {
    pub fn new(classifier: &'a mut AddressClassifier) -> Self {
        Self::with_policy(classifier, DeliveryPolicy::All)
    }

    pub fn with_policy(classifier: &'a mut AddressClassifier, policy: DeliveryPolicy) -> Self {
        TrackSession { classifier, policy }
    }

    /// Process advertisements until the stream ends, handing each decoded
    /// reading to `sink`.
    ///
    /// A sink returning [`ControlFlow::Break`] ends the session immediately,
    /// even while the stream is still open. Callers that cannot write a
    /// reading out should break rather than wait for the stream to close.
    pub async fn run<F>(self, adverts: &mut mpsc::Receiver<RawAdvertisement>, mut sink: F)
    where
        F: FnMut(Reading) -> ControlFlow<()>,
    {
        while let Some(adv) = adverts.recv().await {
            if !self.classifier.admit(&adv.address) {
                continue;
            }

            match Reading::from_advertisement(&adv) {
                Ok(reading) => {
                    if self.policy == DeliveryPolicy::RawOnly && matches!(reading, Reading::Url(_))
                    {
                        continue;
                    }
                    if sink(reading).is_break() {
                        return;
                    }
                }
                Err(_) => self.classifier.record_failure(adv.address),
            }
        }
    }
}
