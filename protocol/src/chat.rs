use std::{
    borrow::Cow,
    io::{Read, Write},
};

use serde::{Deserialize, Serialize};

use crate::{
    io::{read_prefixed, write_prefixed},
    FieldReadError, FieldWriteError, PacketField,
};

/// A plain text chat component, `{"text": ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    text: Cow<'static, str>,
}

impl Message {
    pub fn new<S: Into<Cow<'static, str>>>(text: S) -> Message {
        Message { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compact JSON encoding of this component.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl PacketField for Message {
    fn read_from(buffer: &mut dyn Read) -> Result<Message, FieldReadError> {
        Ok(serde_json::from_slice(&read_prefixed(buffer)?)?)
    }

    fn write_to(&self, buffer: &mut dyn Write) -> Result<(), FieldWriteError> {
        write_prefixed(&self.to_json()?, buffer)
    }
}
