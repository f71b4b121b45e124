//! Boot configuration: what to join, where to connect, how long to wait.

mod record;

use embassy_time::Duration;

use crate::error::ConfigError;
use crate::types::{LinkCredentials, SessionEndpoint};

pub use record::{ProvisioningRecord, RecordCheck, RECORD_LEN, RECORD_MAGIC, RECORD_VERSION};

/// Readiness deadline used when the build does not name one.
pub const DEFAULT_READY_TIMEOUT_SECS: u16 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessPolicy {
    WaitForever,
    Bounded(Duration),
}

impl ReadinessPolicy {
    /// `0` means wait forever.
    pub fn from_secs(secs: u16) -> Self {
        if secs == 0 {
            Self::WaitForever
        } else {
            Self::Bounded(Duration::from_secs(u64::from(secs)))
        }
    }

    pub fn as_secs(self) -> u16 {
        match self {
            Self::WaitForever => 0,
            Self::Bounded(duration) => {
                u16::try_from(duration.as_secs().max(1)).unwrap_or(u16::MAX)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootConfig {
    pub credentials: LinkCredentials,
    pub endpoint: SessionEndpoint,
    pub readiness: ReadinessPolicy,
}

impl BootConfig {
    pub fn from_parts(
        ssid: &str,
        password: &str,
        uri: &str,
        port: Option<u16>,
        ready_timeout_secs: u16,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials: LinkCredentials::new(ssid, password)?,
            endpoint: SessionEndpoint::parse(uri, port)?,
            readiness: ReadinessPolicy::from_secs(ready_timeout_secs),
        })
    }
}

/// Build-time settings as raw strings, typically from `option_env!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompiledSettings<'a> {
    pub ssid: Option<&'a str>,
    pub password: Option<&'a str>,
    pub uri: Option<&'a str>,
    pub port: Option<&'a str>,
    pub ready_timeout_secs: Option<&'a str>,
}

impl CompiledSettings<'_> {
    /// `Ok(None)` when the build carries no network or no endpoint.
    pub fn boot_config(&self) -> Result<Option<BootConfig>, ConfigError> {
        let (Some(ssid), Some(uri)) = (self.ssid, self.uri) else {
            return Ok(None);
        };
        let port = self
            .port
            .map(|port| port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?;
        let ready_timeout_secs = match self.ready_timeout_secs {
            Some(secs) => secs
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidTimeout)?,
            None => DEFAULT_READY_TIMEOUT_SECS,
        };
        BootConfig::from_parts(
            ssid,
            self.password.unwrap_or(""),
            uri,
            port,
            ready_timeout_secs,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_waits_forever() {
        assert_eq!(ReadinessPolicy::from_secs(0), ReadinessPolicy::WaitForever);
        assert_eq!(
            ReadinessPolicy::from_secs(30),
            ReadinessPolicy::Bounded(Duration::from_secs(30))
        );
        assert_eq!(ReadinessPolicy::from_secs(30).as_secs(), 30);
    }

    #[test]
    fn compiled_settings_need_ssid_and_uri() {
        let settings = CompiledSettings {
            ssid: Some("June"),
            ..CompiledSettings::default()
        };
        assert_eq!(settings.boot_config(), Ok(None));
    }

    #[test]
    fn compiled_settings_fill_defaults() {
        let settings = CompiledSettings {
            ssid: Some("June"),
            uri: Some("ws://192.168.1.100"),
            port: Some("8080"),
            ..CompiledSettings::default()
        };
        let config = settings.boot_config().unwrap().unwrap();
        assert!(config.credentials.is_open_network());
        assert_eq!(config.endpoint.port(), 8080);
        assert_eq!(
            config.readiness,
            ReadinessPolicy::from_secs(DEFAULT_READY_TIMEOUT_SECS)
        );
    }

    #[test]
    fn compiled_settings_reject_bad_numbers() {
        let settings = CompiledSettings {
            ssid: Some("June"),
            uri: Some("ws://echo.local"),
            port: Some("eighty"),
            ..CompiledSettings::default()
        };
        assert_eq!(settings.boot_config(), Err(ConfigError::InvalidPort));

        let settings = CompiledSettings {
            ssid: Some("June"),
            uri: Some("ws://echo.local"),
            ready_timeout_secs: Some("-1"),
            ..CompiledSettings::default()
        };
        assert_eq!(settings.boot_config(), Err(ConfigError::InvalidTimeout));
    }

    #[test]
    fn compiled_settings_reject_tls() {
        let settings = CompiledSettings {
            ssid: Some("June"),
            uri: Some("wss://echo.local"),
            ..CompiledSettings::default()
        };
        assert_eq!(settings.boot_config(), Err(ConfigError::UnsupportedScheme));
    }
}
