/// Driver-level link notifications, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// Station interface is up and may associate.
    StationStart,
    /// Joined the access point; no address yet.
    Associated,
    /// DHCP lease applied; the link is usable.
    AddressAcquired,
    /// Association dropped or could not be established.
    LinkLost { reason: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
    Continuation,
}

impl FrameKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Continuation => "continuation",
        }
    }
}

/// One delivered chunk of an inbound frame. Borrowed from the transport's
/// receive buffer for the duration of a single callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InboundFrame<'a> {
    pub kind: FrameKind,
    pub payload: &'a [u8],
    /// Position of `payload` within the whole frame.
    pub offset: usize,
    pub total_len: usize,
}

impl<'a> InboundFrame<'a> {
    /// Whole-frame delivery.
    pub const fn complete(kind: FrameKind, payload: &'a [u8]) -> Self {
        Self {
            kind,
            payload,
            offset: 0,
            total_len: payload.len(),
        }
    }

    pub const fn len(&self) -> usize {
        self.payload.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionFault {
    /// Upgrade handshake rejected or malformed.
    Handshake(&'static str),
    /// Socket level failure (connect, read, write).
    Io(&'static str),
    /// Peer sent a frame the codec refuses.
    Protocol(&'static str),
}

impl SessionFault {
    pub const fn detail(self) -> &'static str {
        match self {
            Self::Handshake(detail) | Self::Io(detail) | Self::Protocol(detail) => detail,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent<'a> {
    Opened,
    Closed,
    Data(InboundFrame<'a>),
    Error(SessionFault),
}

pub fn disconnect_reason_label(reason: u8) -> &'static str {
    match reason {
        2 => "auth_expire",
        4 => "assoc_expire",
        8 => "assoc_leave",
        15 => "4way_handshake_timeout",
        200 => "beacon_timeout",
        201 => "no_ap_found",
        202 => "auth_fail",
        203 => "assoc_fail",
        204 => "handshake_timeout",
        205 => "connection_fail",
        210 => "no_ap_found_compatible_security",
        211 => "no_ap_found_authmode_threshold",
        212 => "no_ap_found_rssi_threshold",
        _ => "other",
    }
}
