use thiserror::Error;

/// Failure reported by the native radio stack when a scan cannot start.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    #[error("bluetooth adapter is disabled")]
    Disabled,

    #[error("no bluetooth LE hardware")]
    NoHardware,

    #[error("radio is busy")]
    Busy,
}

/// Scan-level failure surfaced to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("scanning is unavailable on this adapter")]
    AdapterUnavailable,
}

impl From<AdapterError> for ScanError {
    fn from(_: AdapterError) -> Self {
        ScanError::AdapterUnavailable
    }
}

/// The caller picked a device that is not in the roster.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown device")]
    UnknownDevice,
}

/// Keep-alive probe failure. Never leaves the crate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("keep-alive probe failed")]
pub struct ProbeError;
