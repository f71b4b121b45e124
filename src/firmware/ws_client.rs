use embassy_net::{dns::DnsQueryType, tcp::TcpSocket, IpAddress, Stack};
use embassy_time::with_timeout;
use embedded_io_async::Write;
use esp_hal::rng::Rng;
use linkboot::{
    ws::{self, FrameDecoder, FrameEvent, Opcode, MAX_CONTROL_PAYLOAD},
    InboundFrame, MessageTransport, SessionEndpoint, SessionEvent, SessionEventSink,
    SessionFault, TransportError,
};
use log::{debug, info};

use super::config::{
    SESSION_START, WS_HANDSHAKE_HEAD_MAX, WS_HANDSHAKE_TIMEOUT, WS_KEEPALIVE, WS_READ_CHUNK,
    WS_SOCKET_RX_BUFFER, WS_SOCKET_TX_BUFFER,
};
use super::SessionCell;

const CONTROL_FRAME_MAX: usize = 2 + 4 + MAX_CONTROL_PAYLOAD;

/// Hands the endpoint to `session_task`, which owns the socket.
pub(crate) struct WsTransport {
    network_ready: bool,
}

pub(crate) struct WsHandle {
    endpoint: SessionEndpoint,
    started: bool,
}

impl WsTransport {
    pub(crate) fn new(network_ready: bool) -> Self {
        Self { network_ready }
    }
}

impl MessageTransport for WsTransport {
    type Handle = WsHandle;

    fn init(&mut self, endpoint: &SessionEndpoint) -> Result<WsHandle, TransportError> {
        if !self.network_ready {
            return Err(TransportError::Init("network stack not running"));
        }
        Ok(WsHandle {
            endpoint: endpoint.clone(),
            started: false,
        })
    }

    fn start(&mut self, handle: &mut WsHandle) -> Result<(), TransportError> {
        if handle.started {
            return Err(TransportError::Start("handle already started"));
        }
        SESSION_START.signal(handle.endpoint.clone());
        handle.started = true;
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Closed,
}

#[embassy_executor::task]
pub(crate) async fn session_task(stack: Stack<'static>, session: &'static SessionCell) {
    let endpoint = SESSION_START.wait().await;
    let mut rng = Rng::new();
    let mut rx_buffer = [0u8; WS_SOCKET_RX_BUFFER];
    let mut tx_buffer = [0u8; WS_SOCKET_TX_BUFFER];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer[..], &mut tx_buffer[..]);
    socket.set_keep_alive(Some(WS_KEEPALIVE));

    let outcome = run_session(&mut socket, stack, &endpoint, session, &mut rng).await;
    if let Err(fault) = outcome {
        deliver(session, SessionEvent::Error(fault)).await;
    }
    socket.close();
    let _ = socket.flush().await;
    deliver(session, SessionEvent::Closed).await;
    info!("ws: session over for {}, not reconnecting", endpoint);
}

async fn deliver(session: &'static SessionCell, event: SessionEvent<'_>) {
    session.lock().await.on_session_event(event);
}

async fn resolve(stack: Stack<'static>, endpoint: &SessionEndpoint) -> Result<IpAddress, SessionFault> {
    if let Some(address) = endpoint.host_ipv4() {
        return Ok(IpAddress::Ipv4(address));
    }
    let addresses = stack
        .dns_query(endpoint.host(), DnsQueryType::A)
        .await
        .map_err(|_| SessionFault::Io("dns lookup failed"))?;
    addresses
        .first()
        .copied()
        .ok_or(SessionFault::Io("dns returned no address"))
}

async fn run_session(
    socket: &mut TcpSocket<'_>,
    stack: Stack<'static>,
    endpoint: &SessionEndpoint,
    session: &'static SessionCell,
    rng: &mut Rng,
) -> Result<(), SessionFault> {
    let address = resolve(stack, endpoint).await?;
    info!("ws: connecting {} via {}", endpoint, address);
    socket
        .connect((address, endpoint.port()))
        .await
        .map_err(|_| SessionFault::Io("tcp connect failed"))?;

    let mut nonce = [0u8; 16];
    for chunk in nonce.chunks_mut(4) {
        chunk.copy_from_slice(&rng.random().to_le_bytes());
    }
    let key = ws::client_key(&nonce);
    let request =
        ws::request(endpoint, &key).map_err(|err| SessionFault::Handshake(err.label()))?;
    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| SessionFault::Io("handshake write failed"))?;

    let mut head = [0u8; WS_HANDSHAKE_HEAD_MAX];
    let mut filled = 0usize;
    let header_end = loop {
        if filled == head.len() {
            return Err(SessionFault::Handshake("response head too long"));
        }
        let n = with_timeout(WS_HANDSHAKE_TIMEOUT, socket.read(&mut head[filled..]))
            .await
            .map_err(|_| SessionFault::Io("handshake timeout"))?
            .map_err(|_| SessionFault::Io("handshake read failed"))?;
        if n == 0 {
            return Err(SessionFault::Io("closed during handshake"));
        }
        filled += n;
        if let Some(end) = ws::find_header_end(&head[..filled]) {
            break end;
        }
    };
    ws::validate_response(&head[..header_end], &key)
        .map_err(|err| SessionFault::Handshake(err.label()))?;
    deliver(session, SessionEvent::Opened).await;

    let mut decoder = FrameDecoder::new();
    let early = &head[header_end + 4..filled];
    if process_bytes(&mut decoder, early, socket, session, rng).await? == Flow::Closed {
        return Ok(());
    }

    let mut buf = [0u8; WS_READ_CHUNK];
    loop {
        let n = socket
            .read(&mut buf)
            .await
            .map_err(|_| SessionFault::Io("read failed"))?;
        if n == 0 {
            info!("ws: peer closed the connection");
            return Ok(());
        }
        if process_bytes(&mut decoder, &buf[..n], socket, session, rng).await? == Flow::Closed {
            return Ok(());
        }
    }
}

async fn process_bytes(
    decoder: &mut FrameDecoder,
    mut input: &[u8],
    socket: &mut TcpSocket<'_>,
    session: &'static SessionCell,
    rng: &mut Rng,
) -> Result<Flow, SessionFault> {
    let mut reply = [0u8; CONTROL_FRAME_MAX];
    while !input.is_empty() {
        let (used, event) = decoder
            .decode(input)
            .map_err(|err| SessionFault::Protocol(err.label()))?;
        input = &input[used..];
        let Some(event) = event else {
            continue;
        };

        match event {
            FrameEvent::Data {
                kind,
                chunk,
                offset,
                total,
                ..
            } => {
                let frame = InboundFrame {
                    kind,
                    payload: chunk,
                    offset,
                    total_len: total,
                };
                deliver(session, SessionEvent::Data(frame)).await;
            }
            FrameEvent::Ping(payload) => {
                let len = ws::encode_client_frame(Opcode::Pong, payload, mask(rng), &mut reply)
                    .map_err(|err| SessionFault::Protocol(err.label()))?;
                socket
                    .write_all(&reply[..len])
                    .await
                    .map_err(|_| SessionFault::Io("pong write failed"))?;
                debug!("ws: answered ping");
            }
            FrameEvent::Pong => debug!("ws: pong"),
            FrameEvent::Close { code } => {
                info!("ws: close frame code={:?}", code);
                let echo = code.map(u16::to_be_bytes);
                let payload: &[u8] = match &echo {
                    Some(bytes) => bytes,
                    None => &[],
                };
                let len = ws::encode_client_frame(Opcode::Close, payload, mask(rng), &mut reply)
                    .map_err(|err| SessionFault::Protocol(err.label()))?;
                let _ = socket.write_all(&reply[..len]).await;
                return Ok(Flow::Closed);
            }
        }
    }
    Ok(Flow::Continue)
}

fn mask(rng: &mut Rng) -> [u8; 4] {
    rng.random().to_le_bytes()
}
