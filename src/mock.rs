//! Test doubles for the radio stack, the keep-alive prober and the caller.

use std::string::String;
use std::vec::Vec;

use crate::adapter::{RadioStack, ScanApi, ScanConfig};
use crate::error::{AdapterError, ProbeError, ScanError, SelectionError};
use crate::record::{DeviceRecord, MacString};
use crate::session::{SessionEvent, SessionListener};
use crate::workaround::Prober;

#[derive(Debug, Default)]
pub struct MockRadio {
    pub begins: Vec<(ScanApi, ScanConfig)>,
    pub ends: usize,
    pub fail_with: Option<AdapterError>,
}

impl MockRadio {
    pub fn failing(err: AdapterError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }
}

impl RadioStack for MockRadio {
    fn begin_scan(&mut self, api: ScanApi, config: &ScanConfig) -> Result<(), AdapterError> {
        self.begins.push((api, config.clone()));
        match self.fail_with {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn end_scan(&mut self, _api: ScanApi) {
        self.ends += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingProber {
    pub probed: Vec<String>,
    pub fail: bool,
}

impl RecordingProber {
    pub fn failing() -> Self {
        Self {
            probed: Vec::new(),
            fail: true,
        }
    }
}

impl Prober for RecordingProber {
    fn probe(&mut self, address: &MacString) -> Result<(), ProbeError> {
        self.probed.push(address.as_str().into());
        if self.fail {
            Err(ProbeError)
        } else {
            Ok(())
        }
    }
}

/// Owned copy of a [`SessionEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Roster(Vec<DeviceRecord>),
    Scanning(bool),
    Selected(String, String),
    Cancelled,
    Failed(ScanError),
    Rejected(String, SelectionError),
}

impl From<SessionEvent<'_>> for Recorded {
    fn from(event: SessionEvent<'_>) -> Self {
        match event {
            SessionEvent::RosterUpdated { devices } => Recorded::Roster(devices.to_vec()),
            SessionEvent::ScanningStateChanged { scanning } => Recorded::Scanning(scanning),
            SessionEvent::DeviceSelected { address, name } => {
                Recorded::Selected(address.as_str().into(), name.into())
            }
            SessionEvent::Cancelled => Recorded::Cancelled,
            SessionEvent::Failed { error } => Recorded::Failed(error),
            SessionEvent::SelectionRejected { address, error } => {
                Recorded::Rejected(address.into(), error)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Vec<Recorded>,
}

impl SessionListener for RecordingListener {
    fn on_event(&mut self, event: SessionEvent<'_>) {
        self.events.push(event.into());
    }
}
