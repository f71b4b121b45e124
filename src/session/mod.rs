//! Persistent message-stream session.
//!
//! The manager creates exactly one transport handle, starts it, and then only
//! reacts to lifecycle events. A closed session stays closed.

mod text;

use log::{error, info, warn};

use crate::error::{BootError, TransportError};
use crate::types::{SessionEndpoint, SessionEvent};

pub use text::PayloadText;

/// Client side of the message-stream transport.
pub trait MessageTransport {
    type Handle;

    fn init(&mut self, endpoint: &SessionEndpoint) -> Result<Self::Handle, TransportError>;
    /// Begins connecting; lifecycle events are delivered later through a
    /// [`SessionEventSink`].
    fn start(&mut self, handle: &mut Self::Handle) -> Result<(), TransportError>;
}

pub trait SessionEventSink {
    fn on_session_event(&mut self, event: SessionEvent<'_>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Connecting,
    Open,
    Closed,
}

pub struct SessionManager<T: MessageTransport> {
    transport: T,
    handle: Option<T::Handle>,
    endpoint: Option<SessionEndpoint>,
    phase: SessionPhase,
    frames_received: u32,
    errors_seen: u32,
}

impl<T: MessageTransport> SessionManager<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            handle: None,
            endpoint: None,
            phase: SessionPhase::Idle,
            frames_received: 0,
            errors_seen: 0,
        }
    }

    pub fn start(&mut self, endpoint: SessionEndpoint) -> Result<(), BootError> {
        if self.handle.is_some() {
            warn!(
                "session: start ignored for {}, handle already created",
                endpoint
            );
            return Ok(());
        }

        let mut handle = self.transport.init(&endpoint)?;
        self.transport.start(&mut handle)?;
        info!("session: connecting to {}", endpoint);
        self.handle = Some(handle);
        self.endpoint = Some(endpoint);
        self.phase = SessionPhase::Connecting;
        Ok(())
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn endpoint(&self) -> Option<&SessionEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn frames_received(&self) -> u32 {
        self.frames_received
    }

    pub fn errors_seen(&self) -> u32 {
        self.errors_seen
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: MessageTransport> SessionEventSink for SessionManager<T> {
    fn on_session_event(&mut self, event: SessionEvent<'_>) {
        match event {
            SessionEvent::Opened => {
                info!("session: connected");
                self.phase = SessionPhase::Open;
            }
            SessionEvent::Closed => {
                info!("session: disconnected");
                self.phase = SessionPhase::Closed;
            }
            SessionEvent::Data(frame) => {
                self.frames_received = self.frames_received.wrapping_add(1);
                warn!(
                    "session: received {} len={} at={}/{}: {}",
                    frame.kind.label(),
                    frame.len(),
                    frame.offset,
                    frame.total_len,
                    PayloadText(frame.payload)
                );
            }
            SessionEvent::Error(fault) => {
                self.errors_seen = self.errors_seen.wrapping_add(1);
                error!("session: error {:?}", fault);
            }
        }
    }
}
