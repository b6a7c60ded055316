use crate::types::Username;

packet! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ClientLoginPacket {
        0x00 = Start {
            name: Username,
        },
    }
}
