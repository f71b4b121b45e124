use super::FrameError;
use crate::types::FrameKind;

pub const MAX_CONTROL_PAYLOAD: usize = 125;

const FIN: u8 = 0x80;
const RSV_MASK: u8 = 0x70;
const MASK_BIT: u8 = 0x80;
const MAX_HEADER: usize = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    fn from_bits(bits: u8) -> Result<Self, FrameError> {
        match bits {
            0x0 => Ok(Self::Continuation),
            0x1 => Ok(Self::Text),
            0x2 => Ok(Self::Binary),
            0x8 => Ok(Self::Close),
            0x9 => Ok(Self::Ping),
            0xA => Ok(Self::Pong),
            other => Err(FrameError::UnknownOpcode(other)),
        }
    }

    const fn bits(self) -> u8 {
        match self {
            Self::Continuation => 0x0,
            Self::Text => 0x1,
            Self::Binary => 0x2,
            Self::Close => 0x8,
            Self::Ping => 0x9,
            Self::Pong => 0xA,
        }
    }

    const fn is_control(self) -> bool {
        matches!(self, Self::Close | Self::Ping | Self::Pong)
    }

    const fn data_kind(self) -> FrameKind {
        match self {
            Self::Binary => FrameKind::Binary,
            Self::Continuation => FrameKind::Continuation,
            _ => FrameKind::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent<'a> {
    /// A slice of a data frame's payload. Frames larger than the caller's
    /// buffer arrive as several chunks with increasing `offset`.
    Data {
        kind: FrameKind,
        fin: bool,
        chunk: &'a [u8],
        offset: usize,
        total: usize,
    },
    Ping(&'a [u8]),
    Pong,
    Close { code: Option<u16> },
}

#[derive(Clone, Copy, Debug)]
struct Header {
    opcode: Opcode,
    fin: bool,
    len: u64,
}

/// Incremental decoder for server-to-client frames.
pub struct FrameDecoder {
    header: [u8; MAX_HEADER],
    header_len: usize,
    current: Option<Header>,
    delivered: u64,
    control: [u8; MAX_CONTROL_PAYLOAD],
    in_fragmented_message: bool,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            header: [0; MAX_HEADER],
            header_len: 0,
            current: None,
            delivered: 0,
            control: [0; MAX_CONTROL_PAYLOAD],
            in_fragmented_message: false,
        }
    }

    /// Consumes bytes from `input` until one event is complete or the input
    /// runs out. Returns how many bytes were used; call again with the rest.
    pub fn decode<'a>(
        &'a mut self,
        input: &'a [u8],
    ) -> Result<(usize, Option<FrameEvent<'a>>), FrameError> {
        let mut used = 0;

        let header = match self.current {
            Some(header) => header,
            None => {
                let Some(header) = self.fill_header(input, &mut used)? else {
                    return Ok((used, None));
                };
                self.current = Some(header);
                self.delivered = 0;
                header
            }
        };

        let remaining = (header.len - self.delivered) as usize;
        let take = remaining.min(input.len() - used);

        if header.opcode.is_control() {
            let start = self.delivered as usize;
            self.control[start..start + take].copy_from_slice(&input[used..used + take]);
            used += take;
            self.delivered += take as u64;
            if self.delivered < header.len {
                return Ok((used, None));
            }
            self.current = None;
            let payload = &self.control[..header.len as usize];
            let event = match header.opcode {
                Opcode::Ping => FrameEvent::Ping(payload),
                Opcode::Pong => FrameEvent::Pong,
                _ => FrameEvent::Close {
                    code: close_code(payload)?,
                },
            };
            return Ok((used, Some(event)));
        }

        if take == 0 && remaining > 0 {
            return Ok((used, None));
        }
        let offset = self.delivered as usize;
        let chunk = &input[used..used + take];
        used += take;
        self.delivered += take as u64;
        if self.delivered == header.len {
            self.current = None;
        }
        Ok((
            used,
            Some(FrameEvent::Data {
                kind: header.opcode.data_kind(),
                fin: header.fin,
                chunk,
                offset,
                total: header.len as usize,
            }),
        ))
    }

    fn header_target(&self) -> usize {
        if self.header_len < 2 {
            return 2;
        }
        match self.header[1] & 0x7F {
            126 => 4,
            127 => 10,
            _ => 2,
        }
    }

    fn fill_header(
        &mut self,
        input: &[u8],
        used: &mut usize,
    ) -> Result<Option<Header>, FrameError> {
        loop {
            let target = self.header_target();
            while self.header_len < target && *used < input.len() {
                self.header[self.header_len] = input[*used];
                self.header_len += 1;
                *used += 1;
            }
            if self.header_len < target {
                return Ok(None);
            }
            if self.header_len == 2 {
                self.check_leading_bytes()?;
                if self.header_target() > 2 {
                    continue;
                }
            }
            break;
        }

        let first = self.header[0];
        let opcode = Opcode::from_bits(first & 0x0F)?;
        let fin = first & FIN != 0;
        let len = match self.header[1] & 0x7F {
            126 => u64::from(u16::from_be_bytes([self.header[2], self.header[3]])),
            127 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&self.header[2..10]);
                let len = u64::from_be_bytes(raw);
                if len >> 63 != 0 {
                    self.header_len = 0;
                    return Err(FrameError::LengthOverflow);
                }
                len
            }
            short => u64::from(short),
        };
        self.header_len = 0;

        if opcode.is_control() {
            if !fin || len > MAX_CONTROL_PAYLOAD as u64 {
                return Err(FrameError::BadControlFrame);
            }
        } else {
            self.track_fragmentation(opcode, fin)?;
        }
        if usize::try_from(len).is_err() {
            return Err(FrameError::LengthOverflow);
        }
        Ok(Some(Header { opcode, fin, len }))
    }

    fn check_leading_bytes(&mut self) -> Result<(), FrameError> {
        let [first, second, ..] = self.header;
        let result = if first & RSV_MASK != 0 {
            Err(FrameError::ReservedBits)
        } else if second & MASK_BIT != 0 {
            Err(FrameError::MaskedServerFrame)
        } else {
            Opcode::from_bits(first & 0x0F).map(|_| ())
        };
        if result.is_err() {
            self.header_len = 0;
        }
        result
    }

    fn track_fragmentation(&mut self, opcode: Opcode, fin: bool) -> Result<(), FrameError> {
        match (opcode, self.in_fragmented_message) {
            (Opcode::Continuation, false) => return Err(FrameError::UnexpectedContinuation),
            (Opcode::Text | Opcode::Binary, true) => return Err(FrameError::InterleavedMessage),
            _ => {}
        }
        self.in_fragmented_message = !fin;
        Ok(())
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn close_code(payload: &[u8]) -> Result<Option<u16>, FrameError> {
    match payload {
        [] => Ok(None),
        [_] => Err(FrameError::BadClosePayload),
        [hi, lo, ..] => Ok(Some(u16::from_be_bytes([*hi, *lo]))),
    }
}

/// Writes one masked, final client frame into `out` and returns its length.
pub fn encode_client_frame(
    opcode: Opcode,
    payload: &[u8],
    mask: [u8; 4],
    out: &mut [u8],
) -> Result<usize, FrameError> {
    let mut header = [0u8; MAX_HEADER];
    header[0] = FIN | opcode.bits();
    let mut at = 2;
    match payload.len() {
        len @ 0..=125 => header[1] = MASK_BIT | len as u8,
        len @ 126..=0xFFFF => {
            header[1] = MASK_BIT | 126;
            header[2..4].copy_from_slice(&(len as u16).to_be_bytes());
            at = 4;
        }
        len => {
            header[1] = MASK_BIT | 127;
            header[2..10].copy_from_slice(&(len as u64).to_be_bytes());
            at = 10;
        }
    }
    header[at..at + 4].copy_from_slice(&mask);
    at += 4;

    let total = at + payload.len();
    if out.len() < total {
        return Err(FrameError::BufferTooSmall);
    }
    out[..at].copy_from_slice(&header[..at]);
    for (index, (dst, src)) in out[at..total].iter_mut().zip(payload).enumerate() {
        *dst = src ^ mask[index % 4];
    }
    Ok(total)
}
