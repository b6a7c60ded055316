use super::VarInt;

/// Which set of serverbound packets the connection currently expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Handshake,
    Status,
    Login,
}

impl TryFrom<VarInt> for State {
    type Error = VarInt;

    /// Maps the handshake's `next_state` field. Only status and login may be
    /// requested.
    fn try_from(value: VarInt) -> Result<State, VarInt> {
        match value.0 {
            1 => Ok(State::Status),
            2 => Ok(State::Login),
            _ => Err(value),
        }
    }
}

pub mod client;
pub mod server;
