//! Process entry sequence: storage, configuration, diagnostics, then the
//! orchestrator.

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{info, warn};

use crate::config::{
    BootConfig, CompiledSettings, ProvisioningRecord, ReadinessPolicy, RecordCheck,
};
use crate::error::{BootError, StorageError};
use crate::link::StationDriver;
use crate::orchestrator::Orchestrator;
use crate::session::MessageTransport;

pub trait PersistentStorage {
    fn init(&mut self) -> Result<(), StorageError>;
    fn erase(&mut self) -> Result<(), StorageError>;
    /// The stored record, or `None` when nothing was provisioned.
    fn load_provisioning(&mut self) -> Result<Option<ProvisioningRecord>, StorageError>;
}

pub trait SystemInfo {
    fn free_heap_bytes(&self) -> usize;
    fn platform_version(&self) -> &str;
}

/// Initializes storage, erasing once when the failure is one an erase clears.
pub fn init_storage<S: PersistentStorage>(storage: &mut S) -> Result<(), BootError> {
    match storage.init() {
        Ok(()) => Ok(()),
        Err(err) if err.erase_recovers() => {
            warn!("boot: storage init failed ({}), erasing", err);
            storage.erase()?;
            storage.init()?;
            info!("boot: storage erased and reinitialized");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Provisioning record first, then the build-time settings. A record that
/// does not check as `Valid` is skipped.
pub fn resolve_config<S: PersistentStorage>(
    storage: &mut S,
    compiled: &CompiledSettings<'_>,
) -> Result<BootConfig, BootError> {
    if let Some(record) = storage.load_provisioning()? {
        match record.check() {
            RecordCheck::Valid => {
                let config = record.decode()?;
                info!("boot: config from provisioning record");
                return Ok(config);
            }
            RecordCheck::Blank => {}
            check => warn!("boot: provisioning record unusable ({:?}), ignored", check),
        }
    }
    match compiled.boot_config()? {
        Some(config) => {
            info!("boot: config from build settings");
            Ok(config)
        }
        None => Err(BootError::MissingConfig),
    }
}

pub fn log_diagnostics<I: SystemInfo>(system: &I) {
    info!("boot: free heap {} bytes", system.free_heap_bytes());
    info!("boot: platform {}", system.platform_version());
}

fn log_config(config: &BootConfig) {
    let readiness = match config.readiness {
        ReadinessPolicy::WaitForever => "forever",
        ReadinessPolicy::Bounded(_) => "bounded",
    };
    info!(
        "boot: ssid={} endpoint={} ready_wait={} ({}s)",
        config.credentials.identifier(),
        config.endpoint,
        readiness,
        config.readiness.as_secs()
    );
}

pub async fn run<S, I, M, D, T>(
    storage: &mut S,
    system: &I,
    compiled: &CompiledSettings<'_>,
    orchestrator: &Orchestrator<'_, '_, M, D, T>,
) -> Result<(), BootError>
where
    S: PersistentStorage,
    I: SystemInfo,
    M: RawMutex,
    D: StationDriver,
    T: MessageTransport,
{
    init_storage(storage)?;
    let config = resolve_config(storage, compiled)?;
    log_diagnostics(system);
    log_config(&config);
    orchestrator.run(&config).await
}
