use core::fmt;
use core::net::Ipv4Addr;

use heapless::String;

use crate::error::ConfigError;

pub const DEFAULT_WS_PORT: u16 = 80;
pub const ENDPOINT_HOST_MAX: usize = 64;
pub const ENDPOINT_PATH_MAX: usize = 96;

const WS_SCHEME: &str = "ws://";
const WSS_SCHEME: &str = "wss://";

/// Plain `ws://` message-stream target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEndpoint {
    host: String<ENDPOINT_HOST_MAX>,
    port: u16,
    path: String<ENDPOINT_PATH_MAX>,
}

impl SessionEndpoint {
    /// Parses `ws://host[:port][/path][?query]`. `port_override` wins over the URI
    /// port, the way the transport config `port` field does.
    pub fn parse(uri: &str, port_override: Option<u16>) -> Result<Self, ConfigError> {
        let uri = uri.trim();
        let rest = if let Some(rest) = strip_prefix_ignore_case(uri, WS_SCHEME) {
            rest
        } else if strip_prefix_ignore_case(uri, WSS_SCHEME).is_some() {
            return Err(ConfigError::UnsupportedScheme);
        } else if uri.contains("://") {
            return Err(ConfigError::UnsupportedScheme);
        } else {
            return Err(ConfigError::InvalidUri);
        };

        let (authority, tail) = rest.split_at(rest.find(['/', '?']).unwrap_or(rest.len()));
        let (host, uri_port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?;
                (host, Some(port))
            }
            None => (authority, None),
        };
        if host.is_empty() || host.contains([':', '@', '[', ']', '?', '#']) {
            return Err(ConfigError::InvalidUri);
        }

        let port = port_override.or(uri_port).unwrap_or(DEFAULT_WS_PORT);
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(Self {
            host: String::try_from(host).map_err(|_| ConfigError::HostTooLong {
                max: ENDPOINT_HOST_MAX,
            })?,
            port,
            path: request_path(tail)?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Host as an IPv4 literal, when it is one; otherwise it needs a DNS lookup.
    pub fn host_ipv4(&self) -> Option<Ipv4Addr> {
        self.host.parse().ok()
    }
}

impl fmt::Display for SessionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}{}", WS_SCHEME, self.host, self.port, self.path)
    }
}

/// `/` for an empty tail; a bare query gets a leading `/`.
fn request_path(tail: &str) -> Result<String<ENDPOINT_PATH_MAX>, ConfigError> {
    const TOO_LONG: ConfigError = ConfigError::PathTooLong {
        max: ENDPOINT_PATH_MAX,
    };
    let mut path = String::new();
    if !tail.starts_with('/') {
        path.push('/').map_err(|_| TOO_LONG)?;
    }
    path.push_str(tail).map_err(|_| TOO_LONG)?;
    Ok(path)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
