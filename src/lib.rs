//! Connectivity bootstrap for a station-mode Wi-Fi device.
//!
//! Brings up the wireless link, waits until an address is assigned, then opens
//! one persistent WebSocket session and logs what arrives on it. Everything
//! here is hardware independent; the radio, flash and socket collaborators are
//! traits implemented by the firmware binary.

#![cfg_attr(not(test), no_std)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod link;
pub mod orchestrator;
pub mod pump;
pub mod readiness;
pub mod session;
pub mod types;
pub mod ws;

#[cfg(test)]
mod test_support;

pub use bootstrap::{PersistentStorage, SystemInfo};
pub use config::{BootConfig, CompiledSettings, ProvisioningRecord, ReadinessPolicy};
pub use error::{BootError, ConfigError, DriverError, StorageError, TransportError};
pub use link::{LinkEventSink, LinkManager, LinkState, StationDriver};
pub use orchestrator::Orchestrator;
pub use pump::LinkEventSource;
pub use readiness::ReadinessSignal;
pub use session::{MessageTransport, SessionEventSink, SessionManager, SessionPhase};
pub use types::{
    FrameKind, InboundFrame, LinkCredentials, LinkEvent, SessionEndpoint, SessionEvent,
    SessionFault,
};
