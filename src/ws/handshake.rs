use core::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use heapless::String;
use sha1::{Digest, Sha1};

use super::HandshakeError;
use crate::types::SessionEndpoint;

pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

const UPGRADE_REQUEST_MAX: usize = 384;

pub type ClientKey = String<24>;
pub type AcceptKey = String<28>;
pub type UpgradeRequest = String<UPGRADE_REQUEST_MAX>;

/// `Sec-WebSocket-Key` for a 16 byte nonce.
pub fn client_key(nonce: &[u8; 16]) -> ClientKey {
    let mut out = [0u8; 24];
    let mut key = ClientKey::new();
    if let Ok(len) = STANDARD.encode_slice(nonce, &mut out) {
        for &byte in &out[..len] {
            let _ = key.push(char::from(byte));
        }
    }
    key
}

/// `Sec-WebSocket-Accept` the server must answer for `key`.
pub fn expected_accept(key: &str) -> AcceptKey {
    let digest = Sha1::new()
        .chain_update(key.as_bytes())
        .chain_update(WS_GUID.as_bytes())
        .finalize();
    let mut out = [0u8; 28];
    let mut accept = AcceptKey::new();
    if let Ok(len) = STANDARD.encode_slice(digest, &mut out) {
        for &byte in &out[..len] {
            let _ = accept.push(char::from(byte));
        }
    }
    accept
}

pub fn request(endpoint: &SessionEndpoint, key: &str) -> Result<UpgradeRequest, HandshakeError> {
    let mut out = UpgradeRequest::new();
    write!(
        out,
        "GET {} HTTP/1.1\r\n\
         Host: {}:{}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n",
        endpoint.path(),
        endpoint.host(),
        endpoint.port(),
        key
    )
    .map_err(|_| HandshakeError::RequestTooLong)?;
    Ok(out)
}

/// Offset of the blank line ending an HTTP head.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Checks the server's response head (everything before the blank line).
pub fn validate_response(head: &[u8], key: &str) -> Result<(), HandshakeError> {
    let head = core::str::from_utf8(head).map_err(|_| HandshakeError::Malformed)?;
    let status_line = head.lines().next().ok_or(HandshakeError::Malformed)?;
    let mut parts = status_line.split_ascii_whitespace();
    let version = parts.next().ok_or(HandshakeError::Malformed)?;
    if !version.starts_with("HTTP/1.") {
        return Err(HandshakeError::Malformed);
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(HandshakeError::Malformed)?;
    if status != 101 {
        return Err(HandshakeError::Status(status));
    }

    let mut upgrade = false;
    let mut connection = false;
    let mut accept = None;
    for line in head.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("upgrade") {
            upgrade = value.eq_ignore_ascii_case("websocket");
        } else if name.eq_ignore_ascii_case("connection") {
            connection = value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
        } else if name.eq_ignore_ascii_case("sec-websocket-accept") {
            accept = Some(value);
        }
    }

    if !upgrade {
        return Err(HandshakeError::MissingUpgrade);
    }
    if !connection {
        return Err(HandshakeError::MissingConnection);
    }
    match accept {
        Some(accept) if accept == expected_accept(key).as_str() => Ok(()),
        _ => Err(HandshakeError::AcceptMismatch),
    }
}
