use std::io::Read;

use crate::{Packet, ReadError};

use self::handshake::ClientHandshakePacket;
use self::login::ClientLoginPacket;
use self::status::ClientStatusPacket;

use super::State;

pub mod handshake;
pub mod login;
pub mod status;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    Handshake(ClientHandshakePacket),
    Status(ClientStatusPacket),
    Login(ClientLoginPacket),
}

impl ClientPacket {
    /// Decodes one packet body (id and payload) using the packet set of `state`.
    pub fn decode(state: State, buffer: &mut dyn Read) -> Result<ClientPacket, ReadError> {
        match state {
            State::Handshake => Ok(ClientPacket::Handshake(ClientHandshakePacket::read_from(
                buffer,
            )?)),
            State::Status => Ok(ClientPacket::Status(ClientStatusPacket::read_from(buffer)?)),
            State::Login => Ok(ClientPacket::Login(ClientLoginPacket::read_from(buffer)?)),
        }
    }

    pub fn encode_to(&self, buffer: &mut dyn std::io::Write) -> Result<(), crate::WriteError> {
        match self {
            ClientPacket::Handshake(packet) => packet.write_to(buffer),
            ClientPacket::Status(packet) => packet.write_to(buffer),
            ClientPacket::Login(packet) => packet.write_to(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        io::Raw,
        types::{ServerAddress, ServerPort, Username, UNKNOWN_ADDRESS},
        PacketField, VarInt,
    };

    #[test]
    fn decodes_handshake() {
        let mut body = vec![0x00];
        VarInt(47).write_to(&mut body).unwrap();
        "localhost".to_string().write_to(&mut body).unwrap();
        body.extend_from_slice(&25565u16.to_be_bytes());
        VarInt(1).write_to(&mut body).unwrap();

        let packet = ClientPacket::decode(State::Handshake, &mut &body[..]).unwrap();
        assert_eq!(
            packet,
            ClientPacket::Handshake(ClientHandshakePacket::Handshake {
                protocol_version: VarInt(47),
                server_address: ServerAddress("localhost".to_string()),
                server_port: ServerPort(25565),
                next_state: VarInt(1),
            })
        );
    }

    #[test]
    fn handshake_with_bad_address_length_keeps_decoding() {
        // address length 0, then port and next state
        let body = [0x00, 0x2f, 0x00, 0x63, 0xdd, 0x02];
        let packet = ClientPacket::decode(State::Handshake, &mut &body[..]).unwrap();
        assert_eq!(
            packet,
            ClientPacket::Handshake(ClientHandshakePacket::Handshake {
                protocol_version: VarInt(47),
                server_address: ServerAddress(UNKNOWN_ADDRESS.to_string()),
                server_port: ServerPort(25565),
                next_state: VarInt(2),
            })
        );
    }

    #[test]
    fn handshake_missing_next_state_fails() {
        let body = [0x00, 0x2f, 0x01, b'a', 0x63, 0xdd];
        let err = ClientPacket::decode(State::Handshake, &mut &body[..]).unwrap_err();
        assert!(matches!(err, ReadError::Field("next_state", _)));
    }

    #[test]
    fn wrong_id_is_unrecognized() {
        let err = ClientPacket::decode(State::Handshake, &mut &[0x01][..]).unwrap_err();
        assert!(matches!(err, ReadError::UnrecognizedPacketId(0x01)));

        let err = ClientPacket::decode(State::Login, &mut &[0x02][..]).unwrap_err();
        assert!(matches!(err, ReadError::UnrecognizedPacketId(0x02)));
    }

    #[test]
    fn status_packets() {
        let packet = ClientPacket::decode(State::Status, &mut &[0x00][..]).unwrap();
        assert_eq!(packet, ClientPacket::Status(ClientStatusPacket::Request {}));

        let body = [0x01, 1, 2, 3, 4, 5, 6, 7, 8];
        let packet = ClientPacket::decode(State::Status, &mut &body[..]).unwrap();
        assert_eq!(
            packet,
            ClientPacket::Status(ClientStatusPacket::Ping {
                payload: Raw::new(vec![1, 2, 3, 4, 5, 6, 7, 8]),
            })
        );
    }

    #[test]
    fn login_start_ignores_trailing_fields() {
        // newer clients append a uuid after the name
        let mut body = vec![0x00, 0x05];
        body.extend_from_slice(b"Steve");
        body.extend_from_slice(&[0xab; 16]);

        let packet = ClientPacket::decode(State::Login, &mut &body[..]).unwrap();
        assert_eq!(
            packet,
            ClientPacket::Login(ClientLoginPacket::Start {
                name: Username("Steve".to_string()),
            })
        );
    }

    #[test]
    fn encodes_what_it_decodes() {
        let packet = ClientPacket::Login(ClientLoginPacket::Start {
            name: Username("Alex".to_string()),
        });

        let mut body = Vec::new();
        packet.encode_to(&mut body).unwrap();
        assert_eq!(body, b"\x00\x04Alex");
    }
}
