use crate::{info::ServerInfo, io::Raw};

packet! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ServerStatusPacket {
        0x00 = Response {
            response: ServerInfo,
        },
        0x01 = Pong {
            payload: Raw,
        },
    }
}
