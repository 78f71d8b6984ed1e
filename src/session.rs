/// Scan session state machine.
///
/// Owns start/stop semantics, the bounded scan duration, the roster and the
/// keep-alive workaround. Every method runs on the single owner context;
/// discovery events reach it through the adapter's channel, never directly
/// from the radio callback.
///
/// ```text
///   Idle ──start──▶ Scanning ──stop / timeout / select / cancel──▶ Stopped
///                      ▲                                              │
///                      └──────────────────start───────────────────────┘
/// ```
use embassy_time::{Duration, Instant};

use crate::adapter::{RadioStack, ScanAdapter, ScanConfig, ServiceFilter};
use crate::config::{SessionConfig, ROSTER_CAPACITY};
use crate::error::{ScanError, SelectionError};
use crate::record::{DeviceRecord, DiscoveryEvent, MacString, UuidString};
use crate::roster::{DeviceRoster, Upsert};
use crate::workaround::{CrashWorkaround, Prober};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Stopped,
}

/// Events emitted to the caller.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// Roster changed; the slice is the full roster in first-seen order.
    RosterUpdated { devices: &'a [DeviceRecord] },
    ScanningStateChanged { scanning: bool },
    DeviceSelected { address: &'a MacString, name: &'a str },
    Cancelled,
    Failed { error: ScanError },
    /// A selection named an address the roster does not hold. The
    /// session carries on as before.
    SelectionRejected { address: &'a str, error: SelectionError },
}

/// Receives session events on the owner context.
pub trait SessionListener {
    fn on_event(&mut self, event: SessionEvent<'_>);
}

/// One picker session. `N` is the roster capacity, see [`DeviceRoster`].
pub struct ScanSession<'a, R: RadioStack, P, L, const N: usize = ROSTER_CAPACITY> {
    config: SessionConfig,
    service_uuid: Option<UuidString>,
    adapter: &'a ScanAdapter<'a>,
    radio: R,
    workaround: CrashWorkaround<P>,
    listener: L,
    roster: DeviceRoster<N>,
    state: ScanState,
    epoch: u32,
    deadline: Option<Instant>,
}

impl<'a, R, P, L> ScanSession<'a, R, P, L>
where
    R: RadioStack,
    P: Prober,
    L: SessionListener,
{
    /// Create an idle session with the default roster capacity.
    ///
    /// The scan mechanism is the adapter's. `service_uuid` only restricts
    /// the scan when [`SessionConfig::apply_service_filter`] is set.
    pub fn new(
        config: SessionConfig,
        service_uuid: Option<UuidString>,
        adapter: &'a ScanAdapter<'a>,
        radio: R,
        prober: P,
        listener: L,
    ) -> Self {
        Self::new_sized(config, service_uuid, adapter, radio, prober, listener)
    }
}

impl<'a, R, P, L, const N: usize> ScanSession<'a, R, P, L, N>
where
    R: RadioStack,
    P: Prober,
    L: SessionListener,
{
    /// Create an idle session whose roster holds up to `N` devices.
    pub fn new_sized(
        config: SessionConfig,
        service_uuid: Option<UuidString>,
        adapter: &'a ScanAdapter<'a>,
        radio: R,
        prober: P,
        listener: L,
    ) -> Self {
        Self {
            config,
            service_uuid,
            adapter,
            radio,
            workaround: CrashWorkaround::new(prober),
            listener,
            roster: DeviceRoster::new(),
            state: ScanState::Idle,
            epoch: 0,
            deadline: None,
        }
    }

    /// Begin a scan round at `now`. No-op while already scanning.
    pub fn start(&mut self, now: Instant) -> Result<(), ScanError> {
        if self.state == ScanState::Scanning {
            log::debug!("start ignored, already scanning");
            return Ok(());
        }

        self.workaround.arm();

        self.epoch = next_epoch(self.epoch);
        self.adapter.open(self.epoch);

        let scan_config = self.scan_config();
        if let Err(e) = self.radio.begin_scan(self.adapter.api(), &scan_config) {
            log::warn!("Scan start failed: {}", e);
            self.adapter.close();
            self.workaround.disarm();
            let error = ScanError::from(e);
            self.listener.on_event(SessionEvent::Failed { error });
            return Err(error);
        }

        self.roster.clear();
        self.emit_roster();
        self.state = ScanState::Scanning;
        self.deadline = Some(now + self.config.scan_duration);
        log::info!(
            "Scan started (epoch {}, {:?}, {} ms)",
            self.epoch,
            self.adapter.api(),
            self.config.scan_duration.as_millis()
        );
        self.listener
            .on_event(SessionEvent::ScanningStateChanged { scanning: true });
        Ok(())
    }

    /// End the current scan round. No-op unless scanning.
    pub fn stop(&mut self) {
        if self.state != ScanState::Scanning {
            return;
        }

        self.deadline = None;
        self.adapter.close();
        self.radio.end_scan(self.adapter.api());
        self.workaround.disarm();
        self.state = ScanState::Stopped;
        log::info!("Scan stopped ({} devices)", self.roster.len());
        self.listener
            .on_event(SessionEvent::ScanningStateChanged { scanning: false });
    }

    /// Start when idle or stopped, stop when scanning.
    pub fn toggle(&mut self, now: Instant) -> Result<(), ScanError> {
        match self.state {
            ScanState::Scanning => {
                self.stop();
                Ok(())
            }
            ScanState::Idle | ScanState::Stopped => self.start(now),
        }
    }

    /// Deadline check. Stops the round once `now` reaches the deadline;
    /// a late or repeated firing after a stop does nothing.
    pub fn on_timer(&mut self, now: Instant) {
        match self.deadline {
            Some(deadline) if self.state == ScanState::Scanning && now >= deadline => {
                log::info!("Scan timed out after {} ms", self.config.scan_duration.as_millis());
                self.stop();
            }
            _ => {}
        }
    }

    /// Apply one discovery event from the adapter channel.
    pub fn on_discovery(&mut self, event: &DiscoveryEvent) {
        if self.state != ScanState::Scanning || event.epoch != self.epoch {
            log::debug!(
                "Discarding stale event for {} (epoch {}, current {})",
                event.address,
                event.epoch,
                self.epoch
            );
            return;
        }

        log::trace!("{} rssi={}", event.address, event.rssi);
        let upsert = self.roster.upsert(event);
        // The controller needs the keep-alive whether or not the roster
        // has room to show the device.
        self.workaround.notify(&event.address);
        if upsert != Upsert::Full {
            self.emit_roster();
        }
    }

    /// Finish the session with the device at `address`.
    ///
    /// An unknown address is reported to the listener as well as returned,
    /// and leaves the session as it was.
    pub fn select_device(&mut self, address: &str) -> Result<(), SelectionError> {
        let record = match self.roster.get(address) {
            Some(record) => record.clone(),
            None => {
                let error = SelectionError::UnknownDevice;
                log::warn!("Selection of {} rejected: {}", address, error);
                self.listener
                    .on_event(SessionEvent::SelectionRejected { address, error });
                return Err(error);
            }
        };

        self.stop();
        log::info!("Selected {} \"{}\"", record.address, record.display_name());
        self.listener.on_event(SessionEvent::DeviceSelected {
            address: &record.address,
            name: record.display_name(),
        });
        Ok(())
    }

    /// Finish the session without a selection.
    pub fn cancel(&mut self) {
        self.stop();
        log::info!("Scan cancelled");
        self.listener.on_event(SessionEvent::Cancelled);
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// When the running round times out, if scanning.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn scan_duration(&self) -> Duration {
        self.config.scan_duration
    }

    pub fn snapshot(&self) -> &[DeviceRecord] {
        self.roster.snapshot()
    }

    pub fn workaround(&self) -> &CrashWorkaround<P> {
        &self.workaround
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The scan request for the next round.
    pub fn scan_config(&self) -> ScanConfig {
        let filter = match &self.service_uuid {
            Some(uuid) if self.config.apply_service_filter => ServiceFilter::Service(uuid.clone()),
            _ => ServiceFilter::MatchAll,
        };
        ScanConfig {
            mode: self.config.scan_mode,
            report_delay_ms: self.config.report_delay_ms,
            filter,
        }
    }

    fn emit_roster(&mut self) {
        self.listener.on_event(SessionEvent::RosterUpdated {
            devices: self.roster.snapshot(),
        });
    }
}

impl<R: RadioStack, P, L, const N: usize> ScanSession<'_, R, P, L, N> {
    /// Silent shutdown: end any native scan and disarm the keep-alive
    /// without notifying the listener.
    fn teardown(&mut self) {
        if self.state == ScanState::Scanning {
            log::debug!("Session dropped while scanning, ending scan");
            self.adapter.close();
            self.radio.end_scan(self.adapter.api());
            self.state = ScanState::Stopped;
            self.deadline = None;
        }
        self.workaround.disarm();
    }
}

impl<R: RadioStack, P, L, const N: usize> Drop for ScanSession<'_, R, P, L, N> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Next live epoch; 0 is reserved for "closed".
fn next_epoch(epoch: u32) -> u32 {
    match epoch.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}
