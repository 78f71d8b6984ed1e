/// Keep-alive workaround for controllers that stop reporting scan results.
///
/// Some BLE controllers fall into a faulted state after a scan has been
/// running for a while and silently drop every further scan callback.
/// Sending a benign, non-connecting request to each device we hear from
/// keeps their scan state alive. The request is issued on first sighting
/// and again on every later observation.
///
/// Probes are fire-and-forget: failures are logged at debug level and
/// never reach the discovery path or the caller.
use heapless::Vec;

use crate::config::NOTIFIED_CAPACITY;
use crate::error::ProbeError;
use crate::record::MacString;

/// Native keep-alive primitive.
pub trait Prober {
    /// Queue a lightweight request to `address`. Must not block.
    fn probe(&mut self, address: &MacString) -> Result<(), ProbeError>;
}

pub struct CrashWorkaround<P> {
    prober: P,
    armed: bool,
    notified: Vec<MacString, NOTIFIED_CAPACITY>,
}

impl<P> CrashWorkaround<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober,
            armed: false,
            notified: Vec::new(),
        }
    }

    /// Start accepting notifications for a new scan round.
    pub fn arm(&mut self) {
        self.notified.clear();
        self.armed = true;
    }

    /// Stop probing. Later `notify` calls are no-ops until re-armed.
    pub fn disarm(&mut self) {
        if self.armed {
            log::debug!(
                "Keep-alive disarmed after {} distinct devices",
                self.notified.len()
            );
        }
        self.armed = false;
        self.notified.clear();
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Distinct addresses notified since the last `arm`.
    pub fn distinct_seen(&self) -> usize {
        self.notified.len()
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }
}

impl<P: Prober> CrashWorkaround<P> {
    /// Record `address` as seen and probe it.
    pub fn notify(&mut self, address: &MacString) {
        if !self.armed {
            return;
        }

        // Bookkeeping stops growing at capacity; probes still go out.
        if !self.notified.contains(address) {
            let _ = self.notified.push(address.clone());
        }

        if let Err(e) = self.prober.probe(address) {
            log::debug!("Keep-alive probe to {} failed: {}", address, e);
        }
    }
}
