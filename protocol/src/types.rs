//! Handshake and login fields that clients are known to fill in sloppily.
//!
//! These decode leniently where vanilla clients and proxies disagree with the
//! protocol, substituting a fallback instead of failing the packet.

use std::{
    fmt,
    io::{Read, Write},
};

use crate::{
    io::{read_exactly, read_up_to, write_prefixed},
    FieldReadError, FieldWriteError, PacketField, VarInt,
};

/// Longest accepted server address, in bytes.
pub const MAX_ADDRESS_LENGTH: i32 = 255;

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LENGTH: i32 = 16;

/// Placeholder used when the address length is out of range.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// The address a client used to reach the server.
///
/// A length outside of `1..=255` yields [`UNKNOWN_ADDRESS`] and leaves the
/// announced bytes unread. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress(pub String);

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PacketField for ServerAddress {
    fn read_from(buffer: &mut dyn Read) -> Result<Self, FieldReadError> {
        let length = VarInt::read_from(buffer)?.0;
        if !(1..=MAX_ADDRESS_LENGTH).contains(&length) {
            return Ok(ServerAddress(UNKNOWN_ADDRESS.to_string()));
        }

        let bytes = read_exactly(buffer, length as usize)?;
        Ok(ServerAddress(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        write_prefixed(self.0.as_bytes(), buffer)
    }
}

/// Big-endian port number; `0` when fewer than two bytes remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPort(pub u16);

impl PacketField for ServerPort {
    fn read_from(buffer: &mut dyn Read) -> Result<Self, FieldReadError> {
        let port = match read_up_to(buffer, 2)[..] {
            [high, low] => u16::from_be_bytes([high, low]),
            _ => 0,
        };

        Ok(ServerPort(port))
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        Ok(buffer.write_all(&self.0.to_be_bytes())?)
    }
}

/// Name sent with login start, between 1 and 16 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(pub String);

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PacketField for Username {
    fn read_from(buffer: &mut dyn Read) -> Result<Self, FieldReadError> {
        let length = VarInt::read_from(buffer)?.0;
        if !(1..=MAX_USERNAME_LENGTH).contains(&length) {
            return Err(FieldReadError::LengthOutOfRange {
                length,
                min: 1,
                max: MAX_USERNAME_LENGTH,
            });
        }

        let bytes = read_exactly(buffer, length as usize)?;
        Ok(Username(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        write_prefixed(self.0.as_bytes(), buffer)
    }
}
