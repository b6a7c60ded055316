use crate::{
    types::{ServerAddress, ServerPort},
    VarInt,
};

packet! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ClientHandshakePacket {
        0x00 = Handshake {
            protocol_version: VarInt,
            server_address: ServerAddress,
            server_port: ServerPort,
            next_state: VarInt,
        },
    }
}
