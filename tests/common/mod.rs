#![allow(dead_code)]

use std::collections::VecDeque;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use linkboot::{
    BootConfig, DriverError, LinkCredentials, MessageTransport, PersistentStorage,
    ProvisioningRecord, ReadinessSignal, SessionEndpoint, StationDriver, StorageError,
    SystemInfo, TransportError,
};

pub type Signal = ReadinessSignal<CriticalSectionRawMutex>;

#[derive(Default)]
pub struct MockDriver {
    pub calls: Vec<&'static str>,
    pub fail_init: bool,
}

impl MockDriver {
    pub fn associations(&self) -> usize {
        self.calls.iter().filter(|call| **call == "associate").count()
    }
}

impl StationDriver for MockDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.calls.push("init");
        if self.fail_init {
            return Err(DriverError::Init("radio missing"));
        }
        Ok(())
    }

    fn configure(&mut self, _credentials: &LinkCredentials) -> Result<(), DriverError> {
        self.calls.push("configure");
        Ok(())
    }

    fn start(&mut self) -> Result<(), DriverError> {
        self.calls.push("start");
        Ok(())
    }

    fn request_association(&mut self) -> Result<(), DriverError> {
        self.calls.push("associate");
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTransport {
    pub inits: u32,
    pub starts: u32,
    pub last_endpoint: Option<SessionEndpoint>,
}

impl MessageTransport for MockTransport {
    type Handle = ();

    fn init(&mut self, endpoint: &SessionEndpoint) -> Result<(), TransportError> {
        self.inits += 1;
        self.last_endpoint = Some(endpoint.clone());
        Ok(())
    }

    fn start(&mut self, _handle: &mut ()) -> Result<(), TransportError> {
        self.starts += 1;
        Ok(())
    }
}

/// Storage whose `init` outcomes are scripted; once the script runs out
/// `init` succeeds.
#[derive(Default)]
pub struct MockStorage {
    pub init_results: VecDeque<Result<(), StorageError>>,
    pub inits: u32,
    pub erases: u32,
    pub record: Option<ProvisioningRecord>,
}

impl MockStorage {
    pub fn failing(results: &[Result<(), StorageError>]) -> Self {
        Self {
            init_results: results.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl PersistentStorage for MockStorage {
    fn init(&mut self) -> Result<(), StorageError> {
        self.inits += 1;
        self.init_results.pop_front().unwrap_or(Ok(()))
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.erases += 1;
        self.record = None;
        Ok(())
    }

    fn load_provisioning(&mut self) -> Result<Option<ProvisioningRecord>, StorageError> {
        Ok(self.record.clone())
    }
}

pub struct StaticInfo;

impl SystemInfo for StaticInfo {
    fn free_heap_bytes(&self) -> usize {
        41_000
    }

    fn platform_version(&self) -> &str {
        "host-test"
    }
}

pub fn credentials() -> LinkCredentials {
    LinkCredentials::new("June", "wifipassword").unwrap()
}

pub fn boot_config(ready_timeout_secs: u16) -> BootConfig {
    BootConfig::from_parts(
        "June",
        "wifipassword",
        "ws://192.168.1.100",
        Some(8080),
        ready_timeout_secs,
    )
    .unwrap()
}
