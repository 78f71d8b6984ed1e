/// Scan adapter: normalizes the two native scan callback shapes.
///
/// Legacy: one callback per advertisement with the raw scan record.
/// Modern: filtered/batched scan results with no raw payload guaranteed.
///
/// Exactly one mechanism is used per session; running both on the same
/// radio duplicates results. Both are turned into [`DiscoveryEvent`]s,
/// stamped with the current scan epoch, and pushed through a bounded
/// channel to the session owner. Callbacks run on the radio stack's
/// context and must never block, so sends use `try_send`.
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::{MAX_ADV_PAYLOAD, SCAN_CHANNEL_DEPTH};
use crate::error::AdapterError;
use crate::record::{format_mac, truncated, AdvPayload, DiscoveryEvent, UuidString};

/// Async channel carrying discovery events from the radio callback
/// context to the session owner.
pub type ScanChannel = Channel<CriticalSectionRawMutex, DiscoveryEvent, SCAN_CHANNEL_DEPTH>;

/// Native scanning mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanApi {
    /// Per-advertisement callback with raw scan record.
    Legacy,
    /// Filtered/batched scan results.
    Modern,
}

/// Radio duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    LowPower,
    Balanced,
    LowLatency,
}

/// Advertisement filter handed to the radio stack.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceFilter {
    /// Match every advertisement.
    MatchAll,
    /// Only devices advertising this service UUID.
    Service(UuidString),
}

/// Scan request handed to [`RadioStack::begin_scan`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub mode: ScanMode,
    pub report_delay_ms: u32,
    pub filter: ServiceFilter,
}

/// Native radio stack primitives consumed by the session.
///
/// Both calls are asynchronous requests; any later acknowledgment from
/// the stack is ignored.
pub trait RadioStack {
    fn begin_scan(&mut self, api: ScanApi, config: &ScanConfig) -> Result<(), AdapterError>;
    fn end_scan(&mut self, api: ScanApi);
}

/// A raw callback invocation, before normalization.
#[derive(Debug, Clone, Copy)]
pub enum RawScanResult<'a> {
    Legacy {
        addr: &'a [u8; 6],
        name: Option<&'a str>,
        rssi: i16,
        scan_record: &'a [u8],
    },
    Modern {
        addr: &'a [u8; 6],
        name: Option<&'a str>,
        rssi: i16,
    },
}

impl RawScanResult<'_> {
    pub fn api(&self) -> ScanApi {
        match self {
            RawScanResult::Legacy { .. } => ScanApi::Legacy,
            RawScanResult::Modern { .. } => ScanApi::Modern,
        }
    }

    /// Build the normalized event for scan round `epoch`.
    pub fn normalize(&self, epoch: u32) -> DiscoveryEvent {
        let (addr, name, rssi, payload) = match *self {
            RawScanResult::Legacy {
                addr,
                name,
                rssi,
                scan_record,
            } => (addr, name, rssi, Some(payload_from(scan_record))),
            RawScanResult::Modern { addr, name, rssi } => (addr, name, rssi, None),
        };

        DiscoveryEvent {
            epoch,
            address: format_mac(addr),
            name: name.map(truncated),
            rssi,
            payload,
        }
    }
}

fn payload_from(scan_record: &[u8]) -> AdvPayload {
    let len = scan_record.len().min(MAX_ADV_PAYLOAD);
    if len < scan_record.len() {
        log::debug!(
            "Scan record of {} bytes truncated to {}",
            scan_record.len(),
            MAX_ADV_PAYLOAD
        );
    }
    // Cannot fail: len is clamped to capacity
    AdvPayload::from_slice(&scan_record[..len]).unwrap_or_default()
}

/// Callback-side half of a scan session.
///
/// Shared by reference between the radio callback context and the owner.
/// The owner opens it with a fresh epoch when a round starts and closes it
/// when the round stops; callbacks arriving while closed are dropped here.
pub struct ScanAdapter<'a> {
    api: ScanApi,
    channel: &'a ScanChannel,
    epoch: AtomicU32,
    dropped: AtomicU32,
}

impl<'a> ScanAdapter<'a> {
    pub const fn new(api: ScanApi, channel: &'a ScanChannel) -> Self {
        Self {
            api,
            channel,
            epoch: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    pub fn api(&self) -> ScanApi {
        self.api
    }

    /// Legacy callback: `(device, rssi, scanRecord)`.
    pub fn on_le_scan(&self, addr: &[u8; 6], name: Option<&str>, rssi: i16, scan_record: &[u8]) {
        self.deliver(RawScanResult::Legacy {
            addr,
            name,
            rssi,
            scan_record,
        });
    }

    /// Modern callback: `(device, rssi)`.
    pub fn on_scan_result(&self, addr: &[u8; 6], name: Option<&str>, rssi: i16) {
        self.deliver(RawScanResult::Modern { addr, name, rssi });
    }

    /// Normalize a raw result and queue it for the owner.
    pub fn deliver(&self, raw: RawScanResult<'_>) {
        if raw.api() != self.api {
            log::debug!("Ignoring {:?} result on a {:?} session", raw.api(), self.api);
            return;
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        if epoch == 0 {
            return;
        }

        if self.channel.try_send(raw.normalize(epoch)).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            log::warn!("Scan channel full, {} events dropped", dropped);
        }
    }

    /// Events dropped because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn open(&self, epoch: u32) {
        self.epoch.store(epoch, Ordering::Release);
    }

    pub(crate) fn close(&self) {
        self.epoch.store(0, Ordering::Release);
    }
}
