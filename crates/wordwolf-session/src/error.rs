//! Error types for the session layer.

use wordwolf_protocol::{PlayerId, RoomCode};

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given participant. Either they were never
    /// connected or their connection already closed.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The participant is already seated in a room and tried to join
    /// another.
    #[error("player {player_id} is already in room {code}")]
    AlreadyInRoom { player_id: PlayerId, code: RoomCode },
}
