use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::anyhow;
use log::{debug, error, info, warn};
use protocol::{
    packets::{
        client::{
            handshake::ClientHandshakePacket, login::ClientLoginPacket,
            status::ClientStatusPacket, ClientPacket,
        },
        server::{login::ServerLoginPacket, status::ServerStatusPacket, ServerPacket},
        State,
    },
    VarInt,
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time,
};

use crate::{
    connection::{Connection, ReceiveError, SendError},
    context::Context,
    response,
};

/// Largest ping payload that is echoed back.
const MAX_PING_PAYLOAD: usize = 8;

/// Grace period after the kick so the client can display it before the
/// socket goes away.
const KICK_LINGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitHandshake,
    AwaitStatusRequest,
    AwaitPing,
    AwaitLoginStart,
    Done,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("peer disconnected")]
    Disconnected,

    #[error("unexpected packet while in {phase:?}: {packet:?}")]
    UnexpectedPacket { phase: Phase, packet: ClientPacket },

    #[error("unknown next state {0}")]
    UnknownNextState(VarInt),

    #[error("failed to receive packet")]
    Receive(#[from] ReceiveError),

    #[error("failed to send packet")]
    Send(#[from] SendError),
}

/// Walks one connection through handshake, status or login, and closes it.
pub struct Client<S> {
    connection: Connection<S>,
    address: SocketAddr,
    context: Arc<Context>,
    phase: Phase,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    pub fn new(connection: Connection<S>, address: SocketAddr, context: Arc<Context>) -> Client<S> {
        Client {
            connection,
            address,
            context,
            phase: Phase::AwaitHandshake,
        }
    }

    pub async fn run(mut self) {
        info!("connection from {}", self.address);

        while self.phase != Phase::Done {
            self.phase = match self.step().await {
                Ok(phase) => phase,
                Err(err) => {
                    self.report(err);
                    Phase::Done
                }
            };
        }

        if let Err(err) = self.connection.shutdown().await {
            debug!("failed to shut down connection with {}: {}", self.address, err);
        }

        info!("connection with {} closed", self.address);
    }

    async fn step(&mut self) -> Result<Phase, ClientError> {
        match self.phase {
            Phase::AwaitHandshake => self.handle_handshake().await,
            Phase::AwaitStatusRequest => self.handle_status_request().await,
            Phase::AwaitPing => {
                self.handle_ping().await;
                Ok(Phase::Done)
            }
            Phase::AwaitLoginStart => self.handle_login_start().await,
            Phase::Done => Ok(Phase::Done),
        }
    }

    async fn next_packet(&mut self) -> Result<ClientPacket, ClientError> {
        self.connection
            .read_packet()
            .await?
            .ok_or(ClientError::Disconnected)
    }

    async fn handle_handshake(&mut self) -> Result<Phase, ClientError> {
        let (protocol_version, server_address, server_port, next_state) =
            match self.next_packet().await? {
                ClientPacket::Handshake(ClientHandshakePacket::Handshake {
                    protocol_version,
                    server_address,
                    server_port,
                    next_state,
                }) => (protocol_version, server_address, server_port, next_state),
                packet => {
                    return Err(ClientError::UnexpectedPacket {
                        phase: self.phase,
                        packet,
                    })
                }
            };

        debug!(
            "handshake from {} (protocol {}, address {}:{}, next state {})",
            self.address, protocol_version, server_address, server_port.0, next_state
        );

        match State::try_from(next_state) {
            Ok(State::Status) => {
                info!("status request from {}", self.address);
                self.connection.state = State::Status;
                Ok(Phase::AwaitStatusRequest)
            }
            Ok(State::Login) => {
                self.connection.state = State::Login;
                Ok(Phase::AwaitLoginStart)
            }
            Ok(State::Handshake) | Err(_) => Err(ClientError::UnknownNextState(next_state)),
        }
    }

    async fn handle_status_request(&mut self) -> Result<Phase, ClientError> {
        match self.next_packet().await? {
            ClientPacket::Status(ClientStatusPacket::Request {}) => {}
            packet => {
                return Err(ClientError::UnexpectedPacket {
                    phase: self.phase,
                    packet,
                })
            }
        }

        let response = response::status_response(&self.context);
        self.connection
            .write_packet(ServerPacket::Status(ServerStatusPacket::Response {
                response,
            }))
            .await?;
        info!("status response sent to {}", self.address);

        Ok(Phase::AwaitPing)
    }

    /// Answers an optional ping. The status exchange is already complete, so
    /// nothing here counts as a failure.
    async fn handle_ping(&mut self) {
        let payload = match self.connection.read_packet().await {
            Ok(Some(ClientPacket::Status(ClientStatusPacket::Ping { payload }))) => payload,
            Ok(Some(packet)) => {
                debug!("ignoring {:?} from {} after status", packet, self.address);
                return;
            }
            Ok(None) => return,
            Err(err) => {
                debug!("no ping from {}: {:#}", self.address, anyhow!(err));
                return;
            }
        };

        if !(1..=MAX_PING_PAYLOAD).contains(&payload.len()) {
            debug!(
                "ignoring ping with {} byte payload from {}",
                payload.len(),
                self.address
            );
            return;
        }

        let pong = ServerPacket::Status(ServerStatusPacket::Pong { payload });
        if let Err(err) = self.connection.write_packet(pong).await {
            warn!("ping/pong error with {}: {:#}", self.address, anyhow!(err));
        }
    }

    async fn handle_login_start(&mut self) -> Result<Phase, ClientError> {
        let name = match self.next_packet().await? {
            ClientPacket::Login(ClientLoginPacket::Start { name }) => name,
            packet => {
                return Err(ClientError::UnexpectedPacket {
                    phase: self.phase,
                    packet,
                })
            }
        };
        info!("login attempt from user: {} ({})", name, self.address);

        let reason = response::kick_message(&self.context);
        self.connection
            .write_packet(ServerPacket::Login(ServerLoginPacket::Disconnect { reason }))
            .await?;
        info!("disconnect message sent to {}", self.address);

        time::sleep(KICK_LINGER).await;
        Ok(Phase::Done)
    }

    fn report(&self, err: ClientError) {
        match err {
            ClientError::Disconnected | ClientError::Receive(ReceiveError::ConnectionClosed) => {
                info!("{} disconnected abruptly", self.address)
            }
            ClientError::Receive(ReceiveError::TimedOut) | ClientError::Send(SendError::TimedOut) => {
                info!("{} connection timed out", self.address)
            }
            err @ (ClientError::UnexpectedPacket { .. }
            | ClientError::UnknownNextState(_)
            | ClientError::Receive(
                ReceiveError::InvalidLength(_)
                | ReceiveError::PacketLengthDecode(_)
                | ReceiveError::Decode(_),
            )) => warn!(
                "protocol violation from {} in {:?}: {:#}",
                self.address,
                self.phase,
                anyhow!(err)
            ),
            err => error!("error with {}: {:#}", self.address, anyhow!(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use protocol::{
        info::ServerInfo,
        io::{read_prefixed, write_prefixed},
        PacketField,
    };
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

    use super::*;
    use crate::{config::Config, font::FontWidths};

    fn context() -> Arc<Context> {
        let mut config = Config::default();
        config.server.messages.motd.line_1 = "Hello".to_string();
        config.server.messages.motd.line_2 = "World".to_string();
        config.server.messages.kick_message = "Closed".to_string();
        Arc::new(Context::new(config, FontWidths::default()))
    }

    fn spawn_client(timeout: Duration) -> (DuplexStream, tokio::task::JoinHandle<()>) {
        let (peer, server) = duplex(4096);
        let client = Client::new(
            Connection::with_timeout(server, timeout),
            "127.0.0.1:50000".parse().unwrap(),
            context(),
        );
        (peer, tokio::spawn(client.run()))
    }

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut frame = Vec::new();
        write_prefixed(body, &mut frame).unwrap();
        frame
    }

    fn handshake(next_state: i32) -> Vec<u8> {
        let mut body = vec![0x00];
        VarInt(47).write_to(&mut body).unwrap();
        "localhost".to_string().write_to(&mut body).unwrap();
        body.extend_from_slice(&25565u16.to_be_bytes());
        VarInt(next_state).write_to(&mut body).unwrap();
        frame(&body)
    }

    async fn read_frame(peer: &mut DuplexStream) -> Vec<u8> {
        let mut length = 0u32;
        for position in 0..5 {
            let byte = peer.read_u8().await.unwrap();
            length |= ((byte & 0x7f) as u32) << (position * 7);
            if byte & 0x80 == 0 {
                break;
            }
        }

        let mut body = vec![0; length as usize];
        peer.read_exact(&mut body).await.unwrap();
        body
    }

    async fn read_rest(peer: &mut DuplexStream) -> Vec<u8> {
        let mut rest = Vec::new();
        peer.read_to_end(&mut rest).await.unwrap();
        rest
    }

    #[tokio::test]
    async fn status_then_ping() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(1)).await.unwrap();
        peer.write_all(&frame(&[0x00])).await.unwrap();

        let body = read_frame(&mut peer).await;
        assert_eq!(body[0], 0x00);
        let info = ServerInfo::read_from_slice(&body[1..]).unwrap();
        assert_eq!(info.version().name, "Offline");
        assert_eq!(info.version().protocol, 47);
        assert_eq!(info.description().text(), "Hello\nWorld");

        let payload = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04];
        let mut ping = vec![0x01];
        ping.extend_from_slice(&payload);
        peer.write_all(&frame(&ping)).await.unwrap();

        let pong = read_frame(&mut peer).await;
        assert_eq!(pong[0], 0x01);
        assert_eq!(&pong[1..], &payload);

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn status_without_ping_still_closes() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(1)).await.unwrap();
        peer.write_all(&frame(&[0x00])).await.unwrap();
        let body = read_frame(&mut peer).await;
        assert_eq!(body[0], 0x00);

        peer.shutdown().await.unwrap();
        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn oversized_ping_is_not_answered() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(1)).await.unwrap();
        peer.write_all(&frame(&[0x00])).await.unwrap();
        read_frame(&mut peer).await;

        let mut ping = vec![0x01];
        ping.extend_from_slice(&[0u8; 9]);
        peer.write_all(&frame(&ping)).await.unwrap();

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn ping_instead_of_status_request_is_rejected() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(1)).await.unwrap();
        peer.write_all(&frame(&[0x01, 1, 2, 3, 4, 5, 6, 7, 8])).await.unwrap();

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn login_is_kicked() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(2)).await.unwrap();
        peer.write_all(&frame(b"\x00\x05Steve")).await.unwrap();

        let body = read_frame(&mut peer).await;
        assert_eq!(body[0], 0x00);
        let json = read_prefixed(&mut &body[1..]).unwrap();
        assert_eq!(json, br#"{"text":"Closed"}"#);

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn login_with_bad_username_gets_no_kick() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(2)).await.unwrap();
        let mut login = vec![0x00, 0x11];
        login.extend_from_slice(&[b'a'; 17]);
        peer.write_all(&frame(&login)).await.unwrap();

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_next_state_is_dropped() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&handshake(3)).await.unwrap();

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_handshake_length_is_dropped() {
        for length in [VarInt(0), VarInt(1025)] {
            let (mut peer, worker) = spawn_client(Duration::from_secs(5));

            peer.write_all(&length.write_to_vec().unwrap()).await.unwrap();

            assert!(read_rest(&mut peer).await.is_empty());
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn wrong_handshake_id_is_dropped() {
        let (mut peer, worker) = spawn_client(Duration::from_secs(5));

        peer.write_all(&frame(&[0x03, 0x2f])).await.unwrap();

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (mut peer, worker) = spawn_client(Duration::from_millis(50));

        assert!(read_rest(&mut peer).await.is_empty());
        worker.await.unwrap();
    }
}
