/// Live, deduplicated device roster.
///
/// Records are kept in first-seen order. A repeated address updates its
/// record in place, so a device never moves once it is on screen.
///
/// `N` bounds how many distinct devices fit. It is a deployment limit
/// defaulting to [`ROSTER_CAPACITY`]; below it every distinct address has
/// exactly one record.
use heapless::Vec;

use crate::config::ROSTER_CAPACITY;
use crate::record::{DeviceRecord, DiscoveryEvent};

/// Outcome of [`DeviceRoster::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// New address appended at this position.
    Inserted(usize),
    /// Existing record at this position overwritten.
    Updated(usize),
    /// New address not kept, the roster is at capacity.
    Full,
}

#[derive(Debug, Default)]
pub struct DeviceRoster<const N: usize = ROSTER_CAPACITY> {
    records: Vec<DeviceRecord, N>,
}

impl<const N: usize> DeviceRoster<N> {
    pub const fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Insert a first sighting or refresh the record with the same address.
    pub fn upsert(&mut self, event: &DiscoveryEvent) -> Upsert {
        if let Some(pos) = self.position(&event.address) {
            self.records[pos].refresh(event);
            return Upsert::Updated(pos);
        }

        match self.records.push(DeviceRecord::from(event)) {
            Ok(()) => Upsert::Inserted(self.records.len() - 1),
            Err(_) => {
                log::warn!(
                    "Roster full ({} devices), not showing {}",
                    N,
                    event.address
                );
                Upsert::Full
            }
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Read-only view of the roster in first-seen order.
    pub fn snapshot(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn get(&self, address: &str) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| r.address.as_str() == address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, address: &str) -> Option<usize> {
        self.records.iter().position(|r| r.address.as_str() == address)
    }
}
