use std::{
    fmt::Display,
    io::{Read, Write},
};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::{FieldReadError, FieldWriteError, PacketField};

/// Upper bound on the encoded size of a [`VarInt`].
pub const MAX_VARINT_LENGTH: usize = 5;

/// A 32-bit integer encoded in groups of 7 bits, least significant group
/// first, with the high bit of every byte but the last set.
///
/// Negative values are encoded through their unsigned bit pattern, so any
/// `u32` survives a round trip as `VarInt(value as i32)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarInt(pub i32);

impl VarInt {
    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(self) -> usize {
        let mut value = self.0 as u32;
        let mut length = 1;
        while value >= 0x80 {
            value >>= 7;
            length += 1;
        }
        length
    }
}

impl Display for VarInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> VarInt {
        VarInt(value)
    }
}

impl PacketField for VarInt {
    fn read_from(buffer: &mut dyn Read) -> Result<Self, FieldReadError> {
        let mut value = 0u32;

        for position in 0..MAX_VARINT_LENGTH {
            let byte = buffer.read_u8()?;
            value |= ((byte & 0x7f) as u32) << (position * 7);

            if (byte & 0x80) == 0 {
                return Ok(VarInt(value as i32));
            }
        }

        Err(FieldReadError::VariableTooLarge)
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        let mut value = self.0 as u32;

        loop {
            let part = value as u8;
            value >>= 7;
            if value == 0 {
                buffer.write_u8(part & 0x7f)?;
                break Ok(());
            } else {
                buffer.write_u8(part | 0x80)?;
            }
        }
    }
}
