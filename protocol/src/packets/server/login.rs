use crate::chat::Message;

packet! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ServerLoginPacket {
        0x00 = Disconnect {
            reason: Message,
        },
    }
}
