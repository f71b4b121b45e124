//! Station-mode link lifecycle.
//!
//! [`LinkManager`] owns the station driver, turns driver events into
//! transitions of the link machine, and keeps the readiness signal in step
//! with "link currently believed usable". Dropped or failed associations are
//! retried immediately, forever.

mod machine;

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, info, warn};
use statig::blocking::IntoStateMachineExt as _;

use crate::error::{BootError, DriverError};
use crate::readiness::ReadinessSignal;
use crate::types::{disconnect_reason_label, LinkCredentials, LinkEvent};

pub use machine::LinkState;
use machine::{LinkDispatch, LinkInput, LinkMachine};

/// Station-mode radio operations the link manager drives.
pub trait StationDriver {
    /// Brings up the interface and subscribes to driver events.
    fn init(&mut self) -> Result<(), DriverError>;
    fn configure(&mut self, credentials: &LinkCredentials) -> Result<(), DriverError>;
    fn start(&mut self) -> Result<(), DriverError>;
    /// Asks the radio to (re)join the configured network. Completion arrives
    /// later as `Associated`/`AddressAcquired` or `LinkLost`.
    fn request_association(&mut self) -> Result<(), DriverError>;
}

pub trait LinkEventSink {
    fn on_link_event(&mut self, event: LinkEvent);
}

pub struct LinkManager<'a, M: RawMutex, D: StationDriver> {
    driver: D,
    readiness: &'a ReadinessSignal<M>,
    machine: statig::blocking::StateMachine<LinkMachine>,
    initialized: bool,
    credentials: Option<LinkCredentials>,
    association_attempts: u32,
}

impl<'a, M: RawMutex, D: StationDriver> LinkManager<'a, M, D> {
    pub fn new(driver: D, readiness: &'a ReadinessSignal<M>) -> Self {
        Self {
            driver,
            readiness,
            machine: LinkMachine::new().state_machine(),
            initialized: false,
            credentials: None,
            association_attempts: 0,
        }
    }

    pub fn initialize(&mut self) -> Result<(), BootError> {
        if self.initialized {
            return Ok(());
        }
        self.driver.init().map_err(BootError::StackInit)?;
        self.initialized = true;
        info!("link: driver initialized");
        Ok(())
    }

    /// Configures and starts the station, then returns; the link comes up
    /// asynchronously through driver events.
    pub fn connect(&mut self, credentials: LinkCredentials) -> Result<(), BootError> {
        if !self.initialized {
            return Err(BootError::NotInitialized);
        }

        if let Some(stored) = &self.credentials {
            warn!(
                "link: connect ignored new credentials ssid={} keep ssid={}",
                credentials.identifier(),
                stored.identifier()
            );
        } else {
            self.driver
                .configure(&credentials)
                .map_err(BootError::StationConfig)?;
            self.driver.start().map_err(BootError::StationConfig)?;
            info!(
                "link: station configured ssid={} open={}",
                credentials.identifier(),
                credentials.is_open_network()
            );
            self.credentials = Some(credentials);
        }

        self.dispatch(LinkInput::Connect);
        Ok(())
    }

    pub fn state(&self) -> LinkState {
        self.machine.inner().state
    }

    pub fn association_attempts(&self) -> u32 {
        self.association_attempts
    }

    pub fn credentials(&self) -> Option<&LinkCredentials> {
        self.credentials.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    fn dispatch(&mut self, input: LinkInput) {
        let before = self.state();
        let mut context = LinkDispatch::default();
        self.machine.handle_with_context(&input, &mut context);
        let after = self.state();
        if before != after {
            debug!("link: state {} -> {}", before.label(), after.label());
        }

        match context.readiness {
            Some(true) => self.readiness.set(),
            Some(false) => self.readiness.clear(),
            None => {}
        }
        if context.associate {
            self.request_association();
        }
    }

    fn request_association(&mut self) {
        self.association_attempts = self.association_attempts.saturating_add(1);
        match self.driver.request_association() {
            Ok(()) => debug!("link: association attempt={}", self.association_attempts),
            // The next LinkLost retries; nothing else to do here.
            Err(err) => warn!(
                "link: association attempt={} err={}",
                self.association_attempts, err
            ),
        }
    }
}

impl<M: RawMutex, D: StationDriver> LinkEventSink for LinkManager<'_, M, D> {
    fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::StationStart => info!("link: station started"),
            LinkEvent::Associated => info!("link: associated, waiting for address"),
            LinkEvent::AddressAcquired => info!("link: address acquired"),
            LinkEvent::LinkLost { reason } => warn!(
                "link: lost reason={} ({})",
                reason,
                disconnect_reason_label(reason)
            ),
        }
        self.dispatch(LinkInput::Station(event));
    }
}
