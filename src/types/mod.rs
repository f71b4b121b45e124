mod credentials;
mod endpoint;
mod events;

pub use credentials::{LinkCredentials, WIFI_PASSWORD_MAX, WIFI_SSID_MAX};
pub use endpoint::{SessionEndpoint, DEFAULT_WS_PORT, ENDPOINT_HOST_MAX, ENDPOINT_PATH_MAX};
pub use events::{
    disconnect_reason_label, FrameKind, InboundFrame, LinkEvent, SessionEvent, SessionFault,
};
