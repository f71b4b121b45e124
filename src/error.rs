use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage has no free pages")]
    NoFreePages,
    #[error("storage holds a record from a newer layout")]
    NewVersionFound,
    #[error("storage record is corrupted")]
    Corrupted,
    #[error("storage io failed: {0}")]
    Io(&'static str),
}

impl StorageError {
    /// Errors that an erase followed by a second `init` is expected to clear.
    pub const fn erase_recovers(self) -> bool {
        matches!(
            self,
            Self::NoFreePages | Self::NewVersionFound | Self::Corrupted
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("radio init failed: {0}")]
    Init(&'static str),
    #[error("station config rejected: {0}")]
    Config(&'static str),
    #[error("station start failed: {0}")]
    Start(&'static str),
    #[error("association request failed: {0}")]
    Association(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport init failed: {0}")]
    Init(&'static str),
    #[error("transport start failed: {0}")]
    Start(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("network identifier is empty")]
    EmptyIdentifier,
    #[error("network identifier longer than {max} bytes")]
    IdentifierTooLong { max: usize },
    #[error("network secret longer than {max} bytes")]
    SecretTooLong { max: usize },
    #[error("endpoint scheme not supported (only ws://)")]
    UnsupportedScheme,
    #[error("endpoint uri is malformed")]
    InvalidUri,
    #[error("endpoint host longer than {max} bytes")]
    HostTooLong { max: usize },
    #[error("endpoint path longer than {max} bytes")]
    PathTooLong { max: usize },
    #[error("endpoint port is invalid")]
    InvalidPort,
    #[error("endpoint uri longer than {max} bytes")]
    UriTooLong { max: usize },
    #[error("readiness timeout is not a number of seconds")]
    InvalidTimeout,
    #[error("config text is not valid utf-8")]
    NotUtf8,
}

/// Startup failures. Every variant is fatal for the boot attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("persistent storage unusable: {0}")]
    Storage(#[from] StorageError),
    #[error("no provisioning record and no compiled-in config")]
    MissingConfig,
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("network stack init failed: {0}")]
    StackInit(DriverError),
    #[error("link manager used before initialize()")]
    NotInitialized,
    #[error("station setup failed: {0}")]
    StationConfig(DriverError),
    #[error("link not ready before readiness deadline")]
    LinkTimeout,
    #[error("session transport failed: {0}")]
    Transport(#[from] TransportError),
}
