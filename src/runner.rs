/// Owner-context loop for one scan session.
///
/// Discovery events (from the radio callback context, via the adapter's
/// channel), caller commands and the scan deadline are multiplexed with
/// `select3` and applied to the session one at a time, so the roster and
/// the keep-alive bookkeeping are only ever touched from this task.
use core::future::pending;

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};

use crate::adapter::{RadioStack, ScanChannel};
use crate::config::COMMAND_CHANNEL_DEPTH;
use crate::gateway::{apply, Command, Flow, SessionOutcome};
use crate::session::{ScanSession, SessionListener};
use crate::workaround::Prober;

/// Async channel for caller commands
pub type CommandChannel = Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_DEPTH>;

/// Drive `session` until the caller selects a device, dismisses the
/// dialog, or a scan fails to start.
///
/// The session is not started automatically; send [`Command::Start`] first.
///
/// A rejected selection does not end the loop; the listener hears about it
/// through [`SessionEvent::SelectionRejected`](crate::session::SessionEvent::SelectionRejected).
pub async fn run_session<R, P, L, const N: usize>(
    session: &mut ScanSession<'_, R, P, L, N>,
    scans: &ScanChannel,
    commands: &CommandChannel,
) -> SessionOutcome
where
    R: RadioStack,
    P: Prober,
    L: SessionListener,
{
    loop {
        let deadline = session.deadline();
        let timeout = async move {
            match deadline {
                Some(at) => Timer::at(at).await,
                None => pending::<()>().await,
            }
        };

        match select3(scans.receive(), commands.receive(), timeout).await {
            Either3::First(event) => session.on_discovery(&event),
            Either3::Second(command) => match apply(session, command, Instant::now()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Finished(outcome)) => {
                    log::info!("Session finished: {:?}", outcome);
                    return outcome;
                }
                Err(e) => log::debug!("Scanning continues after {}", e),
            },
            Either3::Third(()) => session.on_timer(Instant::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_time::Duration;

    use super::*;
    use crate::adapter::{ScanAdapter, ScanApi};
    use crate::config::SessionConfig;
    use crate::error::{AdapterError, ScanError, SelectionError};
    use crate::mock::{MockRadio, Recorded, RecordingListener, RecordingProber};
    use crate::session::ScanState;

    const ADDR: [u8; 6] = [0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01];

    fn config() -> SessionConfig {
        SessionConfig::new().with_scan_duration(Duration::from_millis(40))
    }

    #[test]
    fn selection_ends_the_loop() {
        let scans = ScanChannel::new();
        let commands = CommandChannel::new();
        let adapter = ScanAdapter::new(ScanApi::Modern, &scans);
        let mut session = ScanSession::new(
            SessionConfig::new(),
            None,
            &adapter,
            MockRadio::default(),
            RecordingProber::default(),
            RecordingListener::default(),
        );

        commands.try_send(Command::Start).unwrap();
        let radio_and_caller = async {
            Timer::after_millis(5).await;
            adapter.on_scan_result(&ADDR, Some("Pen"), -40);
            adapter.on_scan_result(&ADDR, Some("Pen"), -45);
            Timer::after_millis(5).await;
            commands
                .send(Command::Select("C0:FF:EE:00:00:01".try_into().unwrap()))
                .await;
        };

        let (outcome, ()) = block_on(join(
            run_session(&mut session, &scans, &commands),
            radio_and_caller,
        ));

        assert_eq!(outcome, SessionOutcome::Selected);
        assert_eq!(session.state(), ScanState::Stopped);
        assert_eq!(session.snapshot().len(), 1);
        assert_eq!(session.snapshot()[0].rssi, -45);
        assert_eq!(
            session.listener().events.last(),
            Some(&Recorded::Selected("C0:FF:EE:00:00:01".into(), "Pen".into()))
        );
    }

    #[test]
    fn deadline_stops_scan_but_session_stays_open() {
        let scans = ScanChannel::new();
        let commands = CommandChannel::new();
        let adapter = ScanAdapter::new(ScanApi::Modern, &scans);
        let mut session = ScanSession::new(
            config(),
            None,
            &adapter,
            MockRadio::default(),
            RecordingProber::default(),
            RecordingListener::default(),
        );

        commands.try_send(Command::Start).unwrap();
        let caller = async {
            Timer::after_millis(120).await;
            commands.send(Command::Dismiss).await;
        };

        let (outcome, ()) = block_on(join(run_session(&mut session, &scans, &commands), caller));

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert_eq!(session.radio().ends, 1);
        assert_eq!(
            session.listener().events,
            [
                Recorded::Roster(std::vec::Vec::new()),
                Recorded::Scanning(true),
                Recorded::Scanning(false),
                Recorded::Cancelled,
            ]
        );
    }

    #[test]
    fn unknown_selection_keeps_loop_running() {
        let scans = ScanChannel::new();
        let commands = CommandChannel::new();
        let adapter = ScanAdapter::new(ScanApi::Modern, &scans);
        let mut session = ScanSession::new(
            SessionConfig::new(),
            None,
            &adapter,
            MockRadio::default(),
            RecordingProber::default(),
            RecordingListener::default(),
        );

        commands.try_send(Command::Start).unwrap();
        commands
            .try_send(Command::Select("ZZ:ZZ".try_into().unwrap()))
            .unwrap();
        commands.try_send(Command::Dismiss).unwrap();

        let outcome = block_on(run_session(&mut session, &scans, &commands));
        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(session.listener().events.contains(&Recorded::Rejected(
            "ZZ:ZZ".into(),
            SelectionError::UnknownDevice
        )));
    }

    #[test]
    fn start_failure_is_terminal() {
        let scans = ScanChannel::new();
        let commands = CommandChannel::new();
        let adapter = ScanAdapter::new(ScanApi::Modern, &scans);
        let mut session = ScanSession::new(
            SessionConfig::new(),
            None,
            &adapter,
            MockRadio::failing(AdapterError::Disabled),
            RecordingProber::default(),
            RecordingListener::default(),
        );

        commands.try_send(Command::Start).unwrap();
        let outcome = block_on(run_session(&mut session, &scans, &commands));

        assert_eq!(outcome, SessionOutcome::Failed(ScanError::AdapterUnavailable));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.radio().begins.len(), 1);
    }
}
