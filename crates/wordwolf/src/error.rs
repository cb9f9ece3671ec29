//! Unified error type for the Wordwolf server.

use wordwolf_protocol::ProtocolError;
use wordwolf_room::RoomError;
use wordwolf_session::SessionError;
use wordwolf_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordwolfError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame the server couldn't understand, or a message it couldn't
    /// encode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown participant, already seated).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error, including game rule rejections.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A room command from a participant who hasn't joined one.
    #[error("You are not in a room")]
    NotInRoom,
}

impl WordwolfError {
    /// The text sent back to the client in an `ERROR` message.
    pub fn client_message(&self) -> String {
        match self {
            Self::Room(err) => err.to_string(),
            Self::Protocol(err) => err.client_message(),
            Self::Session(SessionError::AlreadyInRoom { .. }) => {
                RoomError::AlreadyInRoom.to_string()
            }
            Self::NotInRoom => self.to_string(),
            Self::Session(SessionError::NotFound(_))
            | Self::Transport(_) => "Internal error".to_string(),
        }
    }
}
