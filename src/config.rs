/// Scan session configuration.
///
/// Compile-time capacities for the fixed-size collections, plus the runtime
/// [`SessionConfig`] a caller hands to a session at construction.
use embassy_time::Duration;

use crate::adapter::ScanMode;

/// How long one scan round runs before stopping on its own.
pub const SCAN_DURATION: Duration = Duration::from_secs(10);

/// Report delay handed to the radio stack. 0 = deliver each result immediately.
pub const REPORT_DELAY_MS: u32 = 0;

/// Default number of distinct devices a roster holds.
///
/// A deployment limit: sessions that expect denser surroundings pick a
/// larger capacity through the const parameter on
/// [`ScanSession`](crate::session::ScanSession).
pub const ROSTER_CAPACITY: usize = 128;

/// Maximum number of distinct addresses the keep-alive bookkeeping tracks.
pub const NOTIFIED_CAPACITY: usize = ROSTER_CAPACITY;

/// Maximum raw advertisement payload kept per record
/// (31-byte advertisement + 31-byte scan response).
pub const MAX_ADV_PAYLOAD: usize = 62;

/// Depth of the callback → owner discovery channel.
pub const SCAN_CHANNEL_DEPTH: usize = 16;

/// Depth of the caller → owner command channel.
pub const COMMAND_CHANNEL_DEPTH: usize = 4;

/// Runtime configuration for one scan session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Radio duty cycle requested from the stack.
    pub scan_mode: ScanMode,
    /// Bounded duration of one scan round.
    pub scan_duration: Duration,
    /// Batching delay requested from the stack.
    pub report_delay_ms: u32,
    /// Whether the service UUID given at session creation restricts the scan.
    /// Off by default: the scan matches every advertisement.
    pub apply_service_filter: bool,
}

impl SessionConfig {
    pub const fn new() -> Self {
        Self {
            scan_mode: ScanMode::LowPower,
            scan_duration: SCAN_DURATION,
            report_delay_ms: REPORT_DELAY_MS,
            apply_service_filter: false,
        }
    }

    pub const fn with_scan_duration(mut self, scan_duration: Duration) -> Self {
        self.scan_duration = scan_duration;
        self
    }

    pub const fn with_service_filter(mut self, apply: bool) -> Self {
        self.apply_service_filter = apply;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
