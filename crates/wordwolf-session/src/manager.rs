//! The session manager: tracks every open participant connection.
//!
//! Responsibilities:
//! - Minting a fresh `PlayerId` and [`Outbox`] per connection
//! - Remembering which room (if any) each participant sits in
//! - Forgetting the participant when their connection closes
//!
//! # Concurrency note
//!
//! `SessionManager` is a plain `HashMap` wrapper. The server shares it
//! behind a `tokio::sync::Mutex`; nothing here awaits.

use std::collections::HashMap;

use rand::Rng;
use tokio::sync::mpsc;

use wordwolf_protocol::{PlayerId, RoomCode, ServerMessage};

use crate::{Outbox, Session, SessionConfig, SessionError, SessionState};

/// Manages all open participant sessions.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ attach() ──→ detach() ──→ attach() ...
///    │            │            │
///    ▼            ▼            ▼
///  [Idle]     [InRoom]      [Idle]
///
/// disconnect() from any state removes the session.
/// ```
#[derive(Debug)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new, empty session manager with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// The limits every session is created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registers a new connection.
    ///
    /// Returns the session (in the `Idle` state) and the receiving end of
    /// its outbox, which the caller's writer task drains.
    pub fn create(&mut self) -> (Session, mpsc::Receiver<ServerMessage>) {
        let player_id = loop {
            let candidate = generate_player_id();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let (outbox, rx) =
            Outbox::channel(player_id.clone(), self.config.outbound_capacity);
        let session = Session {
            player_id: player_id.clone(),
            state: SessionState::Idle,
            outbox,
        };
        self.sessions.insert(player_id.clone(), session.clone());

        tracing::info!(%player_id, "session created");
        (session, rx)
    }

    /// Fails if the participant is already seated somewhere.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] for an unknown participant,
    /// [`SessionError::AlreadyInRoom`] if they are attached.
    pub fn ensure_idle(&self, player_id: &PlayerId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.clone()))?;

        match &session.state {
            SessionState::Idle => Ok(()),
            SessionState::InRoom { code } => Err(SessionError::AlreadyInRoom {
                player_id: player_id.clone(),
                code: code.clone(),
            }),
        }
    }

    /// Records that the participant now sits in room `code`.
    ///
    /// # Errors
    /// Same as [`ensure_idle`](Self::ensure_idle).
    pub fn attach(
        &mut self,
        player_id: &PlayerId,
        code: RoomCode,
    ) -> Result<(), SessionError> {
        self.ensure_idle(player_id)?;
        let session = self
            .sessions
            .get_mut(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.clone()))?;

        tracing::debug!(%player_id, room = %code, "session attached");
        session.state = SessionState::InRoom { code };
        Ok(())
    }

    /// Returns the participant to `Idle`, yielding the room they left.
    pub fn detach(&mut self, player_id: &PlayerId) -> Option<RoomCode> {
        let session = self.sessions.get_mut(player_id)?;
        match std::mem::replace(&mut session.state, SessionState::Idle) {
            SessionState::Idle => None,
            SessionState::InRoom { code } => {
                tracing::debug!(%player_id, room = %code, "session detached");
                Some(code)
            }
        }
    }

    /// Forgets the participant entirely. Returns the removed session so
    /// the caller can see which room still needs to be told.
    pub fn disconnect(&mut self, player_id: &PlayerId) -> Option<Session> {
        let session = self.sessions.remove(player_id)?;
        tracing::info!(%player_id, "session closed");
        Some(session)
    }

    /// Looks up a session.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// The room the participant is attached to, if any.
    pub fn room_of(&self, player_id: &PlayerId) -> Option<&RoomCode> {
        self.sessions.get(player_id).and_then(Session::room)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generates a random 32-character lowercase hex ID (128 bits).
fn generate_player_id() -> PlayerId {
    let bytes: [u8; 16] = rand::rng().random();
    PlayerId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default())
    }

    fn code(s: &str) -> RoomCode {
        RoomCode::new(s)
    }

    #[test]
    fn test_create_returns_idle_session_with_hex_id() {
        let mut mgr = manager();

        let (session, _rx) = mgr.create();

        assert_eq!(session.state, SessionState::Idle);
        assert_eq!(session.player_id.as_str().len(), 32);
        assert!(
            session
                .player_id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_hexdigit())
        );
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_create_twice_gives_distinct_ids() {
        let mut mgr = manager();

        let (a, _rx_a) = mgr.create();
        let (b, _rx_b) = mgr.create();

        assert_ne!(a.player_id, b.player_id);
    }

    #[test]
    fn test_outbox_feeds_returned_receiver() {
        let mut mgr = manager();
        let (session, mut rx) = mgr.create();

        assert!(session.outbox.deliver(ServerMessage::error("hi")));

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::error("hi"));
    }

    #[test]
    fn test_attach_idle_session_records_room() {
        let mut mgr = manager();
        let (session, _rx) = mgr.create();

        mgr.attach(&session.player_id, code("WOLF-0001")).unwrap();

        assert_eq!(mgr.room_of(&session.player_id), Some(&code("WOLF-0001")));
    }

    #[test]
    fn test_attach_when_already_in_room_returns_error() {
        let mut mgr = manager();
        let (session, _rx) = mgr.create();
        mgr.attach(&session.player_id, code("WOLF-0001")).unwrap();

        let result = mgr.attach(&session.player_id, code("WOLF-0002"));

        assert!(matches!(
            result,
            Err(SessionError::AlreadyInRoom { code, .. }) if code.as_str() == "WOLF-0001"
        ));
        assert_eq!(mgr.room_of(&session.player_id), Some(&code("WOLF-0001")));
    }

    #[test]
    fn test_attach_unknown_player_returns_not_found() {
        let mut mgr = manager();

        let result = mgr.attach(&PlayerId::new("ghost"), code("WOLF-0001"));

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_detach_returns_room_and_allows_new_attach() {
        let mut mgr = manager();
        let (session, _rx) = mgr.create();
        mgr.attach(&session.player_id, code("WOLF-0001")).unwrap();

        assert_eq!(mgr.detach(&session.player_id), Some(code("WOLF-0001")));
        assert_eq!(mgr.detach(&session.player_id), None);
        mgr.ensure_idle(&session.player_id).unwrap();
    }

    #[test]
    fn test_disconnect_removes_session() {
        let mut mgr = manager();
        let (session, _rx) = mgr.create();
        mgr.attach(&session.player_id, code("WOLF-0001")).unwrap();

        let removed = mgr.disconnect(&session.player_id).unwrap();

        assert_eq!(removed.room(), Some(&code("WOLF-0001")));
        assert!(mgr.is_empty());
        assert!(mgr.disconnect(&session.player_id).is_none());
    }
}
