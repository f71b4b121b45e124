mod channels;

use embassy_time::Duration;
use linkboot::CompiledSettings;

pub(crate) use channels::{LINK_EVENTS, RADIO_COMMANDS, SESSION_START};

pub(crate) const HEAP_SIZE: usize = 72 * 1024;
pub(crate) const FATAL_RESET_DELAY: Duration = Duration::from_secs(3);

pub(crate) const WS_SOCKET_RX_BUFFER: usize = 2048;
pub(crate) const WS_SOCKET_TX_BUFFER: usize = 1024;
pub(crate) const WS_READ_CHUNK: usize = 1024;
pub(crate) const WS_HANDSHAKE_HEAD_MAX: usize = 1024;
pub(crate) const WS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const WS_KEEPALIVE: Duration = Duration::from_secs(30);

pub(crate) fn compiled_settings() -> CompiledSettings<'static> {
    CompiledSettings {
        ssid: option_env!("LINKBOOT_WIFI_SSID").or(option_env!("SSID")),
        password: option_env!("LINKBOOT_WIFI_PASSWORD").or(option_env!("PASSWORD")),
        uri: option_env!("LINKBOOT_SESSION_URI"),
        port: option_env!("LINKBOOT_SESSION_PORT"),
        ready_timeout_secs: option_env!("LINKBOOT_READY_TIMEOUT_SECS"),
    }
}
