use crate::io::Raw;

packet! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ClientStatusPacket {
        0x00 = Request { },
        0x01 = Ping {
            payload: Raw,
        },
    }
}
