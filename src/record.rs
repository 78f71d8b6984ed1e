/// Discovered-device value types.
///
/// A [`DiscoveryEvent`] is one normalized observation coming out of the scan
/// adapter; a [`DeviceRecord`] is what the roster keeps per hardware address.
/// Uses `heapless` types for no_std/no-alloc operation.
use core::fmt::Write;

use heapless::{String, Vec};

use crate::config::MAX_ADV_PAYLOAD;

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Maximum length for device name strings
pub type NameString = String<33>;

/// Maximum length for UUID strings
pub type UuidString = String<37>;

/// Raw advertisement bytes kept with a record
pub type AdvPayload = Vec<u8, MAX_ADV_PAYLOAD>;

/// One normalized observation of a peripheral.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryEvent {
    /// Scan round the observation belongs to. 0 is never a live round.
    pub epoch: u32,
    pub address: MacString,
    /// Name the radio stack had cached at report time, if any.
    pub name: Option<NameString>,
    pub rssi: i16,
    /// Legacy scans carry the raw scan record; modern scans carry none.
    pub payload: Option<AdvPayload>,
}

/// One discovered peripheral as shown in the roster.
///
/// `address` is the key and never changes once the record exists; every
/// other field is overwritten by the latest observation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub address: MacString,
    pub name: Option<NameString>,
    pub rssi: i16,
    pub payload: Option<AdvPayload>,
}

impl DeviceRecord {
    /// The reported name, or "" when the device never reported one.
    pub fn display_name(&self) -> &str {
        self.name.as_ref().map(|n| n.as_str()).unwrap_or("")
    }

    /// Overwrite everything but the address with a newer observation.
    pub(crate) fn refresh(&mut self, event: &DiscoveryEvent) {
        self.name = event.name.clone();
        self.rssi = event.rssi;
        self.payload = event.payload.clone();
    }
}

impl From<&DiscoveryEvent> for DeviceRecord {
    fn from(event: &DiscoveryEvent) -> Self {
        Self {
            address: event.address.clone(),
            name: event.name.clone(),
            rssi: event.rssi,
            payload: event.payload.clone(),
        }
    }
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6]) -> MacString {
    let mut buf = MacString::new();
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    buf
}

/// Copy `s` into a fixed-capacity string, cutting at the last char boundary
/// that fits.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    let _ = out.push_str(&s[..end]);
    out
}
