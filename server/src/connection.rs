use std::{io::Cursor, time::Duration};

use bytes::{Buf, BytesMut};
use log::trace;
use protocol::{
    packets::{client::ClientPacket, server::ServerPacket, State},
    PacketField, VarInt,
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter},
    time,
};

/// Largest packet body (id and payload) a client may announce.
pub const MAX_PACKET_LENGTH: usize = 1024;

/// How long a single read or write may stall before the peer is dropped.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("connection closed in the middle of a packet")]
    ConnectionClosed,

    #[error("invalid packet length {0}")]
    InvalidLength(i32),

    #[error("packet length decoding error")]
    PacketLengthDecode(#[source] protocol::FieldReadError),

    #[error("failed to decode packet")]
    Decode(#[from] protocol::ReadError),

    #[error("failed to read from stream")]
    Read(#[from] std::io::Error),

    #[error("timed out waiting for data")]
    TimedOut,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to encode packet length")]
    PacketLengthEncode(#[from] protocol::FieldWriteError),

    #[error("failed to encode packet")]
    Encode(#[from] protocol::WriteError),

    #[error("failed to write to stream")]
    Write(#[from] std::io::Error),

    #[error("timed out writing to stream")]
    TimedOut,
}

/// Length-prefixed packet framing on top of a byte stream.
pub struct Connection<S> {
    stream: BufWriter<S>,
    packet_buf: Vec<u8>,
    staging_buf: Vec<u8>,
    buffer: BytesMut,
    timeout: Duration,
    pub state: State,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Connection<S> {
        Connection::with_timeout(stream, READ_TIMEOUT)
    }

    pub fn with_timeout(stream: S, timeout: Duration) -> Connection<S> {
        Connection {
            stream: BufWriter::new(stream),
            packet_buf: Vec::new(),
            staging_buf: Vec::new(),
            buffer: BytesMut::new(),
            timeout,
            state: State::Handshake,
        }
    }

    /// Reads the next packet. Returns `None` if the peer closed the stream
    /// cleanly between two packets.
    pub async fn read_packet(&mut self) -> Result<Option<ClientPacket>, ReceiveError> {
        loop {
            if let Some(packet) = self.parse_packet()? {
                return Ok(Some(packet));
            }

            let bytes_read = time::timeout(self.timeout, self.stream.read_buf(&mut self.buffer))
                .await
                .map_err(|_| ReceiveError::TimedOut)??;

            if bytes_read == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                } else {
                    return Err(ReceiveError::ConnectionClosed);
                }
            }
        }
    }

    fn parse_packet(&mut self) -> Result<Option<ClientPacket>, ReceiveError> {
        let (offset, length) = {
            let mut buf = Cursor::new(&self.buffer[..]);
            let length = match VarInt::read_from(&mut buf) {
                Ok(length) => length.0,
                Err(err) if err.is_eof() => return Ok(None),
                Err(err) => return Err(ReceiveError::PacketLengthDecode(err)),
            };

            // Reject before the body arrives, a hostile length must not make us buffer it.
            if length <= 0 || length as usize > MAX_PACKET_LENGTH {
                return Err(ReceiveError::InvalidLength(length));
            }

            let offset = buf.position() as usize;
            if self.buffer.len() < offset + length as usize {
                return Ok(None);
            }

            (offset, length as usize)
        };

        self.buffer.advance(offset);
        let body = self.buffer.split_to(length);

        let packet = ClientPacket::decode(self.state, &mut &body[..])?;
        trace!("received packet: {:?}", packet);
        Ok(Some(packet))
    }

    pub async fn write_packet(&mut self, packet: ServerPacket) -> Result<(), SendError> {
        packet.encode_to(&mut self.packet_buf)?;
        stage_packet_into(&mut self.staging_buf, &self.packet_buf)?;
        self.packet_buf.clear();

        let result = time::timeout(
            self.timeout,
            write_frame(&mut self.stream, &self.staging_buf),
        )
        .await;
        self.staging_buf.clear();
        result.map_err(|_| SendError::TimedOut)??;

        trace!("sent packet: {:?}", packet);

        Ok(())
    }

    /// Flushes anything pending and shuts down the write half.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        time::timeout(self.timeout, self.stream.shutdown())
            .await
            .map_err(|_| std::io::ErrorKind::TimedOut)?
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(stream: &mut W, frame: &[u8]) -> std::io::Result<()> {
    stream.write_all(frame).await?;
    stream.flush().await
}

fn stage_packet_into(staging_buf: &mut Vec<u8>, packet_buf: &[u8]) -> Result<(), SendError> {
    VarInt(packet_buf.len() as i32).write_to(staging_buf)?;
    staging_buf.extend_from_slice(packet_buf);

    Ok(())
}
