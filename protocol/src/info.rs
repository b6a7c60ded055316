use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
    chat::Message,
    io::{read_prefixed, write_prefixed},
    FieldReadError, FieldWriteError, PacketField,
};

/// Body of the status response shown in a client's server list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    version: VersionInfo,
    players: ServerPlayerInfo,
    description: Message,
}

impl ServerInfo {
    pub fn new(version: VersionInfo, players: ServerPlayerInfo, motd: Message) -> ServerInfo {
        ServerInfo {
            version,
            players,
            description: motd,
        }
    }

    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    pub fn description(&self) -> &Message {
        &self.description
    }

    /// Compact JSON encoding of the status response.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl PacketField for ServerInfo {
    fn read_from(buffer: &mut dyn Read) -> Result<ServerInfo, FieldReadError> {
        Ok(serde_json::from_slice(&read_prefixed(buffer)?)?)
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        write_prefixed(&self.to_json()?, buffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPlayerInfo {
    max: i32,
    online: i32,
    sample: Vec<String>,
}

impl ServerPlayerInfo {
    /// Nobody online, nobody allowed, and a single blank sample entry so the
    /// client renders an empty hover list.
    pub fn empty() -> ServerPlayerInfo {
        ServerPlayerInfo {
            max: 0,
            online: 0,
            sample: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}
