use core::fmt;

use heapless::String;

use crate::error::ConfigError;

pub const WIFI_SSID_MAX: usize = 32;
pub const WIFI_PASSWORD_MAX: usize = 64;

#[derive(Clone, PartialEq, Eq)]
pub struct LinkCredentials {
    identifier: String<WIFI_SSID_MAX>,
    secret: String<WIFI_PASSWORD_MAX>,
}

impl LinkCredentials {
    pub fn new(identifier: &str, secret: &str) -> Result<Self, ConfigError> {
        if identifier.is_empty() {
            return Err(ConfigError::EmptyIdentifier);
        }
        let identifier = String::try_from(identifier).map_err(|_| {
            ConfigError::IdentifierTooLong {
                max: WIFI_SSID_MAX,
            }
        })?;
        let secret = String::try_from(secret).map_err(|_| ConfigError::SecretTooLong {
            max: WIFI_PASSWORD_MAX,
        })?;
        Ok(Self { identifier, secret })
    }

    /// Builds credentials from raw record bytes; both parts must be UTF-8.
    pub fn from_parts(identifier: &[u8], secret: &[u8]) -> Result<Self, ConfigError> {
        let identifier = core::str::from_utf8(identifier).map_err(|_| ConfigError::NotUtf8)?;
        let secret = core::str::from_utf8(secret).map_err(|_| ConfigError::NotUtf8)?;
        Self::new(identifier, secret)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_open_network(&self) -> bool {
        self.secret.is_empty()
    }
}

// Never print the secret.
impl fmt::Debug for LinkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkCredentials")
            .field("identifier", &self.identifier.as_str())
            .field("secret_len", &self.secret.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_limits() {
        let ssid = "s".repeat(WIFI_SSID_MAX);
        let pass = "p".repeat(WIFI_PASSWORD_MAX);
        let creds = LinkCredentials::new(&ssid, &pass).unwrap();
        assert_eq!(creds.identifier().len(), WIFI_SSID_MAX);
        assert_eq!(creds.secret().len(), WIFI_PASSWORD_MAX);
        assert!(!creds.is_open_network());
    }

    #[test]
    fn rejects_empty_identifier() {
        assert_eq!(
            LinkCredentials::new("", "secret"),
            Err(ConfigError::EmptyIdentifier)
        );
    }

    #[test]
    fn rejects_oversized_parts() {
        let ssid = "s".repeat(WIFI_SSID_MAX + 1);
        assert_eq!(
            LinkCredentials::new(&ssid, ""),
            Err(ConfigError::IdentifierTooLong { max: WIFI_SSID_MAX })
        );
        let pass = "p".repeat(WIFI_PASSWORD_MAX + 1);
        assert_eq!(
            LinkCredentials::new("June", &pass),
            Err(ConfigError::SecretTooLong {
                max: WIFI_PASSWORD_MAX
            })
        );
    }

    #[test]
    fn empty_secret_is_open_network() {
        let creds = LinkCredentials::new("cafe", "").unwrap();
        assert!(creds.is_open_network());
    }

    #[test]
    fn debug_hides_secret() {
        let creds = LinkCredentials::new("June", "wifipassword").unwrap();
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("June"));
        assert!(!rendered.contains("wifipassword"));
    }
}
