//! Client side of the WebSocket protocol: opening handshake and frame codec.
//! No I/O here; the firmware transport feeds socket bytes through it.

mod frame;
mod handshake;

use thiserror::Error;

pub use frame::{encode_client_frame, FrameDecoder, FrameEvent, Opcode, MAX_CONTROL_PAYLOAD};
pub use handshake::{
    client_key, expected_accept, find_header_end, request, validate_response, AcceptKey, ClientKey,
    UpgradeRequest, WS_GUID,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("upgrade request does not fit the buffer")]
    RequestTooLong,
    #[error("response head is not valid http")]
    Malformed,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("missing `Upgrade: websocket`")]
    MissingUpgrade,
    #[error("missing `Connection: upgrade`")]
    MissingConnection,
    #[error("Sec-WebSocket-Accept does not match the key")]
    AcceptMismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("reserved bits set")]
    ReservedBits,
    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),
    #[error("server frame is masked")]
    MaskedServerFrame,
    #[error("control frame fragmented or longer than 125 bytes")]
    BadControlFrame,
    #[error("close payload of one byte")]
    BadClosePayload,
    #[error("payload length has the top bit set")]
    LengthOverflow,
    #[error("continuation without a fragmented message")]
    UnexpectedContinuation,
    #[error("new message inside a fragmented one")]
    InterleavedMessage,
    #[error("output buffer too small")]
    BufferTooSmall,
}

impl HandshakeError {
    pub const fn label(self) -> &'static str {
        match self {
            Self::RequestTooLong => "request_too_long",
            Self::Malformed => "malformed_response",
            Self::Status(_) => "unexpected_status",
            Self::MissingUpgrade => "missing_upgrade",
            Self::MissingConnection => "missing_connection",
            Self::AcceptMismatch => "accept_mismatch",
        }
    }
}

impl FrameError {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReservedBits => "reserved_bits",
            Self::UnknownOpcode(_) => "unknown_opcode",
            Self::MaskedServerFrame => "masked_server_frame",
            Self::BadControlFrame => "bad_control_frame",
            Self::BadClosePayload => "bad_close_payload",
            Self::LengthOverflow => "length_overflow",
            Self::UnexpectedContinuation => "unexpected_continuation",
            Self::InterleavedMessage => "interleaved_message",
            Self::BufferTooSmall => "buffer_too_small",
        }
    }
}
