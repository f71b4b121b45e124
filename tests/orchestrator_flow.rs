mod common;

use core::pin::pin;
use core::task::Poll;

use embassy_futures::{block_on, poll_once};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::Duration;
use linkboot::pump::dispatch_next_link_event;
use linkboot::{
    BootError, DriverError, FrameKind, InboundFrame, LinkEvent, LinkEventSink, LinkManager,
    LinkState, Orchestrator, ReadinessPolicy, SessionEvent, SessionEventSink, SessionManager,
    SessionPhase,
};

use common::{boot_config, credentials, MockDriver, MockTransport, Signal};

type Link<'r> = Mutex<CriticalSectionRawMutex, LinkManager<'r, CriticalSectionRawMutex, MockDriver>>;
type Session = Mutex<CriticalSectionRawMutex, SessionManager<MockTransport>>;

#[test]
fn session_starts_only_after_address_acquired() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    let orchestrator = Orchestrator::new(&link, &session, &signal);
    let config = boot_config(0);

    let mut run = pin!(orchestrator.run(&config));
    assert!(poll_once(run.as_mut()).is_pending());
    assert_eq!(block_on(link.lock()).state(), LinkState::Connecting);
    assert_eq!(
        block_on(link.lock()).driver().calls,
        ["init", "configure", "start"]
    );
    assert_eq!(block_on(session.lock()).transport().inits, 0);

    let events: Channel<CriticalSectionRawMutex, LinkEvent, 8> = Channel::new();
    events.try_send(LinkEvent::StationStart).unwrap();
    events.try_send(LinkEvent::Associated).unwrap();
    let mut receiver = events.receiver();
    block_on(dispatch_next_link_event(&mut receiver, &link));
    block_on(dispatch_next_link_event(&mut receiver, &link));
    assert!(poll_once(run.as_mut()).is_pending());

    events.try_send(LinkEvent::AddressAcquired).unwrap();
    block_on(dispatch_next_link_event(&mut receiver, &link));
    assert_eq!(poll_once(run.as_mut()), Poll::Ready(Ok(())));

    let session = block_on(session.lock());
    assert_eq!(session.transport().inits, 1);
    assert_eq!(session.transport().starts, 1);
    assert_eq!(session.phase(), SessionPhase::Connecting);
    assert_eq!(
        session.transport().last_endpoint.as_ref().map(|e| e.port()),
        Some(8080)
    );
}

#[test]
fn already_connected_link_starts_session_on_first_poll() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    {
        let mut manager = block_on(link.lock());
        manager.initialize().unwrap();
        manager.connect(credentials()).unwrap();
        manager.on_link_event(LinkEvent::StationStart);
        manager.on_link_event(LinkEvent::AddressAcquired);
        assert_eq!(manager.state(), LinkState::Connected);
    }
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    let orchestrator = Orchestrator::new(&link, &session, &signal);

    let config = boot_config(30);
    assert_eq!(poll_once(orchestrator.run(&config)), Poll::Ready(Ok(())));
    assert_eq!(block_on(session.lock()).transport().starts, 1);
    assert_eq!(block_on(link.lock()).state(), LinkState::Connected);
}

#[test]
fn bounded_wait_times_out_without_starting_session() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    let orchestrator = Orchestrator::new(&link, &session, &signal);

    let mut config = boot_config(0);
    config.readiness = ReadinessPolicy::Bounded(Duration::from_millis(30));
    assert_eq!(block_on(orchestrator.run(&config)), Err(BootError::LinkTimeout));
    assert_eq!(block_on(session.lock()).transport().inits, 0);
}

#[test]
fn bounded_wait_starts_session_when_address_arrives_in_time() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    let orchestrator = Orchestrator::new(&link, &session, &signal);
    let config = boot_config(30);
    assert_eq!(
        config.readiness,
        ReadinessPolicy::Bounded(Duration::from_secs(30))
    );

    let mut run = pin!(orchestrator.run(&config));
    assert!(poll_once(run.as_mut()).is_pending());

    let events: Channel<CriticalSectionRawMutex, LinkEvent, 8> = Channel::new();
    let mut receiver = events.receiver();
    events.try_send(LinkEvent::StationStart).unwrap();
    block_on(dispatch_next_link_event(&mut receiver, &link));
    assert!(poll_once(run.as_mut()).is_pending());
    assert_eq!(block_on(session.lock()).transport().inits, 0);

    events.try_send(LinkEvent::AddressAcquired).unwrap();
    block_on(dispatch_next_link_event(&mut receiver, &link));
    assert_eq!(poll_once(run.as_mut()), Poll::Ready(Ok(())));

    assert_eq!(block_on(link.lock()).state(), LinkState::Connected);
    let session = block_on(session.lock());
    assert_eq!(session.transport().starts, 1);
    assert_eq!(session.phase(), SessionPhase::Connecting);
}

#[test]
fn driver_init_failure_stops_before_connect() {
    let signal = Signal::new();
    let driver = MockDriver {
        fail_init: true,
        ..MockDriver::default()
    };
    let link: Link<'_> = Mutex::new(LinkManager::new(driver, &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    let orchestrator = Orchestrator::new(&link, &session, &signal);

    assert_eq!(
        block_on(orchestrator.run(&boot_config(0))),
        Err(BootError::StackInit(DriverError::Init("radio missing")))
    );
    assert_eq!(block_on(link.lock()).driver().calls, ["init"]);
}

#[test]
fn session_traffic_leaves_link_alone() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    {
        let mut manager = block_on(link.lock());
        manager.initialize().unwrap();
        manager.connect(credentials()).unwrap();
        manager.on_link_event(LinkEvent::StationStart);
        manager.on_link_event(LinkEvent::AddressAcquired);
    }
    let orchestrator = Orchestrator::new(&link, &session, &signal);
    assert_eq!(block_on(orchestrator.run(&boot_config(0))), Ok(()));

    let mut manager = block_on(session.lock());
    let endpoint = manager.endpoint().cloned();
    manager.on_session_event(SessionEvent::Opened);
    manager.on_session_event(SessionEvent::Data(InboundFrame::complete(
        FrameKind::Text,
        b"ping",
    )));
    manager.on_session_event(SessionEvent::Closed);

    assert_eq!(manager.frames_received(), 1);
    assert_eq!(manager.endpoint().cloned(), endpoint);
    assert_eq!(manager.phase(), SessionPhase::Closed);
    assert_eq!(manager.transport().starts, 1);
    assert_eq!(block_on(link.lock()).state(), LinkState::Connected);
    assert!(signal.is_set());
}

#[test]
fn link_loss_after_session_start_does_not_touch_session() {
    let signal = Signal::new();
    let link: Link<'_> = Mutex::new(LinkManager::new(MockDriver::default(), &signal));
    let session: Session = Mutex::new(SessionManager::new(MockTransport::default()));
    signal.set();
    let orchestrator = Orchestrator::new(&link, &session, &signal);
    assert_eq!(block_on(orchestrator.run(&boot_config(0))), Ok(()));

    block_on(link.lock()).on_link_event(LinkEvent::LinkLost { reason: 200 });
    assert!(!signal.is_set());
    assert_eq!(block_on(link.lock()).state(), LinkState::Disconnected);
    assert_eq!(block_on(link.lock()).driver().associations(), 1);
    assert_eq!(block_on(session.lock()).transport().starts, 1);
}
