use core::fmt::Write as _;

use heapless::String;

use super::{BootConfig, ReadinessPolicy};
use crate::error::ConfigError;
use crate::types::{LinkCredentials, SessionEndpoint, WIFI_PASSWORD_MAX, WIFI_SSID_MAX};

pub const RECORD_MAGIC: u32 = 0x4C4E_4B42;
pub const RECORD_VERSION: u8 = 1;

const URI_MAX: usize = 96;

const MAGIC_AT: usize = 0;
const VERSION_AT: usize = 4;
const SSID_AT: usize = 5;
const PASSWORD_AT: usize = SSID_AT + 1 + WIFI_SSID_MAX;
const URI_AT: usize = PASSWORD_AT + 1 + WIFI_PASSWORD_MAX;
const PORT_AT: usize = URI_AT + 1 + URI_MAX;
const TIMEOUT_AT: usize = PORT_AT + 2;
const CHECKSUM_AT: usize = TIMEOUT_AT + 2;

pub const RECORD_LEN: usize = CHECKSUM_AT + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordCheck {
    /// Erased flash.
    Blank,
    Valid,
    /// Magic and checksum match but the layout version is not ours.
    UnknownVersion(u8),
    Corrupt,
}

/// Raw provisioning record as stored in the last flash sector.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisioningRecord {
    bytes: [u8; RECORD_LEN],
}

impl ProvisioningRecord {
    pub const fn from_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.bytes
    }

    pub fn encode(config: &BootConfig) -> Result<Self, ConfigError> {
        let mut uri = String::<URI_MAX>::new();
        // Port goes in its own field; the URI keeps scheme, host and path.
        write!(
            uri,
            "ws://{}{}",
            config.endpoint.host(),
            config.endpoint.path()
        )
        .map_err(|_| ConfigError::UriTooLong { max: URI_MAX })?;

        let mut bytes = [0u8; RECORD_LEN];
        bytes[MAGIC_AT..VERSION_AT].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        bytes[VERSION_AT] = RECORD_VERSION;
        put_field(&mut bytes, SSID_AT, WIFI_SSID_MAX, config.credentials.identifier());
        put_field(
            &mut bytes,
            PASSWORD_AT,
            WIFI_PASSWORD_MAX,
            config.credentials.secret(),
        );
        put_field(&mut bytes, URI_AT, URI_MAX, &uri);
        bytes[PORT_AT..TIMEOUT_AT].copy_from_slice(&config.endpoint.port().to_le_bytes());
        bytes[TIMEOUT_AT..CHECKSUM_AT]
            .copy_from_slice(&config.readiness.as_secs().to_le_bytes());
        bytes[CHECKSUM_AT] = checksum8(&bytes[..CHECKSUM_AT]);
        Ok(Self { bytes })
    }

    pub fn check(&self) -> RecordCheck {
        let bytes = &self.bytes;
        if bytes.iter().all(|&byte| byte == 0xFF) {
            return RecordCheck::Blank;
        }
        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != RECORD_MAGIC || checksum8(&bytes[..CHECKSUM_AT]) != bytes[CHECKSUM_AT] {
            return RecordCheck::Corrupt;
        }
        if bytes[VERSION_AT] != RECORD_VERSION {
            return RecordCheck::UnknownVersion(bytes[VERSION_AT]);
        }
        RecordCheck::Valid
    }

    /// Decodes a record whose [`check`](Self::check) is `Valid`.
    pub fn decode(&self) -> Result<BootConfig, ConfigError> {
        let ssid = field(
            &self.bytes,
            SSID_AT,
            WIFI_SSID_MAX,
            ConfigError::IdentifierTooLong { max: WIFI_SSID_MAX },
        )?;
        let password = field(
            &self.bytes,
            PASSWORD_AT,
            WIFI_PASSWORD_MAX,
            ConfigError::SecretTooLong {
                max: WIFI_PASSWORD_MAX,
            },
        )?;
        let uri = field(
            &self.bytes,
            URI_AT,
            URI_MAX,
            ConfigError::UriTooLong { max: URI_MAX },
        )?;
        let uri = core::str::from_utf8(uri).map_err(|_| ConfigError::NotUtf8)?;
        let port = u16::from_le_bytes([self.bytes[PORT_AT], self.bytes[PORT_AT + 1]]);
        let timeout = u16::from_le_bytes([self.bytes[TIMEOUT_AT], self.bytes[TIMEOUT_AT + 1]]);

        Ok(BootConfig {
            credentials: LinkCredentials::from_parts(ssid, password)?,
            endpoint: SessionEndpoint::parse(uri, (port != 0).then_some(port))?,
            readiness: ReadinessPolicy::from_secs(timeout),
        })
    }
}

impl core::fmt::Debug for ProvisioningRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProvisioningRecord")
            .field("check", &self.check())
            .finish()
    }
}

fn put_field(bytes: &mut [u8; RECORD_LEN], at: usize, max: usize, value: &str) {
    let len = value.len().min(max);
    bytes[at] = len as u8;
    bytes[at + 1..at + 1 + len].copy_from_slice(&value.as_bytes()[..len]);
}

fn field(
    bytes: &[u8; RECORD_LEN],
    at: usize,
    max: usize,
    too_long: ConfigError,
) -> Result<&[u8], ConfigError> {
    let len = usize::from(bytes[at]);
    if len > max {
        return Err(too_long);
    }
    Ok(&bytes[at + 1..at + 1 + len])
}

fn checksum8(bytes: &[u8]) -> u8 {
    let mut acc = 0x5Au8;
    for &byte in bytes {
        acc ^= byte.rotate_left(1);
    }
    acc
}
