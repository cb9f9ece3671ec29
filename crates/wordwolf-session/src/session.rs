//! Session types: the server's record of one connected participant.
//!
//! A session tracks:
//! - WHO the participant is (a server-generated `PlayerId`)
//! - WHERE they are (not yet in a room, or attached to one)
//! - HOW to reach them (their [`Outbox`])

use std::time::Duration;

use wordwolf_protocol::{PlayerId, RoomCode};

use crate::Outbox;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Per-connection limits.
///
/// Create with `SessionConfig::default()` and override just the fields
/// you care about.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Messages that may wait in an outbox before new ones are dropped.
    ///
    /// Default: 256.
    pub outbound_capacity: usize,

    /// A connection that sends nothing (not even a pong) for this long is
    /// closed.
    ///
    /// Default: 60 seconds.
    pub idle_timeout: Duration,

    /// How often the server pings each connection. Must be shorter than
    /// `idle_timeout` so a healthy client always answers in time.
    ///
    /// Default: 54 seconds.
    pub ping_interval: Duration,

    /// Largest inbound frame accepted, in bytes. Larger frames are
    /// answered with an error and otherwise ignored.
    ///
    /// Default: 64 KiB.
    pub max_message_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 256,
            idle_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(54),
            max_message_size: 64 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a participant currently is.
///
/// ```text
///   Idle ──(join)──→ InRoom ──(leave/teardown)──→ Idle
/// ```
///
/// A participant can only be attached to one room at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected but not in any room yet.
    Idle,

    /// Seated in the room with this code.
    InRoom { code: RoomCode },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single participant's session. Lives exactly as long as their
/// connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Server-generated identity, also used as the player's ID in rooms.
    pub player_id: PlayerId,

    /// Lobby or room.
    pub state: SessionState,

    /// Queue feeding this participant's socket.
    pub outbox: Outbox,
}

impl Session {
    /// The room this participant is attached to, if any.
    pub fn room(&self) -> Option<&RoomCode> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::InRoom { code } => Some(code),
        }
    }
}
