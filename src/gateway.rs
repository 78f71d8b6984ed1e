/// Selection gateway: the boundary between the presentation layer and a session.
///
/// Inbound, caller intents arrive as [`Command`]s and are applied to the
/// session with [`apply`]. Outbound, [`SelectionGateway`] turns the
/// session's event stream into calls on the caller's [`SelectionListener`].
/// The gateway keeps no state of its own.
use embassy_time::Instant;

use crate::adapter::RadioStack;
use crate::error::{ScanError, SelectionError};
use crate::record::{DeviceRecord, MacString};
use crate::session::{ScanSession, SessionEvent, SessionListener};
use crate::workaround::Prober;

/// Commands issued by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    /// Start if stopped, stop if scanning (the scan/cancel button).
    Toggle,
    Select(MacString),
    /// Dialog dismissed: cancel the session.
    Dismiss,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Selected,
    Cancelled,
    /// Scan could not start. The caller decides whether to open a new session.
    Failed(ScanError),
}

/// Result of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished(SessionOutcome),
}

/// Apply a caller command to the session at time `now`.
///
/// An unknown selection is returned as an error and the session keeps
/// whatever state it had.
pub fn apply<R, P, L, const N: usize>(
    session: &mut ScanSession<'_, R, P, L, N>,
    command: Command,
    now: Instant,
) -> Result<Flow, SelectionError>
where
    R: RadioStack,
    P: Prober,
    L: SessionListener,
{
    let started = match command {
        Command::Start => session.start(now),
        Command::Toggle => session.toggle(now),
        Command::Stop => {
            session.stop();
            Ok(())
        }
        Command::Select(address) => {
            session.select_device(&address)?;
            return Ok(Flow::Finished(SessionOutcome::Selected));
        }
        Command::Dismiss => {
            session.cancel();
            return Ok(Flow::Finished(SessionOutcome::Cancelled));
        }
    };

    match started {
        Ok(()) => Ok(Flow::Continue),
        Err(e) => Ok(Flow::Finished(SessionOutcome::Failed(e))),
    }
}

/// Caller-side listener.
///
/// Only the two terminal signals are required; roster and status updates
/// are for callers that render the live list.
pub trait SelectionListener {
    /// The user picked a device. `name` is empty when the device never
    /// reported one.
    fn on_device_selected(&mut self, address: &str, name: &str);

    /// The dialog was dismissed without a selection.
    fn on_cancelled(&mut self);

    fn on_roster_updated(&mut self, _devices: &[DeviceRecord]) {}

    fn on_scanning_changed(&mut self, _scanning: bool) {}

    fn on_failed(&mut self, _error: ScanError) {}

    /// A selection named a device the roster does not hold; the session
    /// keeps scanning.
    fn on_selection_rejected(&mut self, _address: &str, _error: SelectionError) {}
}

/// Forwards session events to a [`SelectionListener`].
pub struct SelectionGateway<C> {
    caller: C,
}

impl<C: SelectionListener> SelectionGateway<C> {
    pub fn new(caller: C) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }
}

impl<C: SelectionListener> SessionListener for SelectionGateway<C> {
    fn on_event(&mut self, event: SessionEvent<'_>) {
        match event {
            SessionEvent::RosterUpdated { devices } => self.caller.on_roster_updated(devices),
            SessionEvent::ScanningStateChanged { scanning } => {
                self.caller.on_scanning_changed(scanning)
            }
            SessionEvent::DeviceSelected { address, name } => {
                self.caller.on_device_selected(address, name)
            }
            SessionEvent::Cancelled => self.caller.on_cancelled(),
            SessionEvent::Failed { error } => self.caller.on_failed(error),
            SessionEvent::SelectionRejected { address, error } => {
                self.caller.on_selection_rejected(address, error)
            }
        }
    }
}
