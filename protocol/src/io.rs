use std::{
    borrow::Cow,
    io::{Read, Write},
};

use crate::{FieldReadError, FieldWriteError, PacketField, VarInt};

/// Reads up to `length` bytes, stopping early when the reader runs dry or
/// fails. The caller has to compare the returned length against `length`.
pub fn read_up_to(buffer: &mut dyn Read, length: usize) -> Vec<u8> {
    let mut data = Vec::new();
    let _ = Read::take(&mut *buffer, length as u64).read_to_end(&mut data);
    data
}

/// Writes `data` prefixed with its length as a [`VarInt`].
pub fn write_prefixed(data: &[u8], buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
    let length = i32::try_from(data.len()).map_err(|_| FieldWriteError::TooLong(data.len()))?;
    VarInt(length).write_to(buffer)?;
    buffer.write_all(data)?;
    Ok(())
}

/// Reads a [`VarInt`] length followed by exactly that many bytes.
pub fn read_prefixed(buffer: &mut dyn Read) -> Result<Vec<u8>, FieldReadError> {
    let length = VarInt::read_from(buffer)?.0;
    if length < 0 {
        return Err(FieldReadError::LengthOutOfRange {
            length,
            min: 0,
            max: i32::MAX,
        });
    }

    read_exactly(buffer, length as usize)
}

pub(crate) fn read_exactly(buffer: &mut dyn Read, length: usize) -> Result<Vec<u8>, FieldReadError> {
    let data = read_up_to(buffer, length);
    if data.len() != length {
        return Err(FieldReadError::Truncated {
            expected: length,
            actual: data.len(),
        });
    }

    Ok(data)
}

impl PacketField for String {
    fn read_from(buffer: &mut dyn Read) -> Result<Self, FieldReadError> {
        Ok(String::from_utf8(read_prefixed(buffer)?)?)
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        write_prefixed(self.as_bytes(), buffer)
    }
}

/// The unparsed remainder of a packet body.
#[derive(Clone, PartialEq, Eq)]
pub struct Raw(pub Cow<'static, [u8]>);

impl Raw {
    pub fn new<S: Into<Cow<'static, [u8]>>>(data: S) -> Raw {
        Raw(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Raw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Raw({} bytes)", self.0.len())
    }
}

impl PacketField for Raw {
    fn read_from(buffer: &mut dyn Read) -> Result<Raw, FieldReadError> {
        let mut vec = Vec::new();
        buffer.read_to_end(&mut vec)?;
        Ok(Raw::new(vec))
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        Ok(buffer.write_all(&self.0)?)
    }
}
