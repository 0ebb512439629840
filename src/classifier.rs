//! Address classification: which broadcasters are worth decoding.
//!
//! The classifier keeps two independent filters. The allow-set, when
//! configured, is fixed for the classifier's lifetime and admits only listed
//! addresses. The deny-set is learned: once an address fails to decode it is
//! recorded and skipped until the classifier is rebuilt. Both filters must
//! pass for an address to be admitted.

use crate::mac_address::MacAddress;
use std::collections::HashSet;

/// Decides whether an observed address should be processed at all.
///
/// One classifier instance lives as long as the scanner and is shared across
/// scan windows, so addresses denied in one window stay denied in the next.
#[derive(Debug, Default)]
pub struct AddressClassifier {
    allow: Option<HashSet<MacAddress>>,
    deny: HashSet<MacAddress>,
}

impl AddressClassifier {
    /// Classifier without an allow-set: every address not yet denied passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier restricted to the given addresses.
    pub fn with_allow_list<I>(allow: I) -> Self
    where
        I: IntoIterator<Item = MacAddress>,
    {
        AddressClassifier {
            allow: Some(allow.into_iter().collect()),
            deny: HashSet::new(),
        }
    }

    /// Should an advertisement from this address be processed?
    pub fn admit(&self, address: &MacAddress) -> bool {
        if self.deny.contains(address) {
            return false;
        }
        match &self.allow {
            Some(allow) => allow.contains(address),
            None => true,
        }
    }

    /// Record that this address failed to decode; it will be skipped from now
    /// on. Idempotent.
    pub fn record_failure(&mut self, address: MacAddress) {
        self.deny.insert(address);
    }

    /// Addresses learned not to be RuuviTags.
    pub fn denied(&self) -> &HashSet<MacAddress> {
        &self.deny
    }
}
