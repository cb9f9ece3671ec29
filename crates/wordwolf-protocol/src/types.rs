//! Core protocol types for Wordwolf's wire format.
//!
//! Every type here travels "on the wire" inside a [`ServerMessage`] or a
//! [`ClientCommand`]. Field names are camelCase and enum values are
//! SCREAMING_SNAKE_CASE because that is what the browser client reads.
//!
//! [`ServerMessage`]: crate::ServerMessage
//! [`ClientCommand`]: crate::ClientCommand

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Opaque to clients: the server generates it (humans on join, bots when
/// added) and clients only echo it back as a vote or hint target.
/// `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The short, human-readable code of a room (e.g. `WOLF-0042`).
///
/// Codes are case-insensitive for players typing them in, so
/// [`RoomCode::new`] trims and upper-cases its input.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes and wraps a room code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// One discrete stage of a game's lifecycle.
///
/// ```text
/// LOBBY → ROLE_REVEAL → WORD_SELECTION → DAY_PHASE ─┬→ VOTING ─────────┬→ GAME_OVER → LOBBY
///                                                   └→ WEREWOLF_GUESS ─┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Lobby,
    RoleReveal,
    WordSelection,
    DayPhase,
    Voting,
    WerewolfGuess,
    GameOver,
}

impl Phase {
    /// The wire name of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lobby => "LOBBY",
            Self::RoleReveal => "ROLE_REVEAL",
            Self::WordSelection => "WORD_SELECTION",
            Self::DayPhase => "DAY_PHASE",
            Self::Voting => "VOTING",
            Self::WerewolfGuess => "WEREWOLF_GUESS",
            Self::GameOver => "GAME_OVER",
        }
    }

    /// Returns `true` if new players may join a room in this phase.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` for the two phases that collect votes.
    pub fn is_voting(self) -> bool {
        matches!(self, Self::Voting | Self::WerewolfGuess)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's secret role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Villager,
    Werewolf,
    Seer,
}

impl Role {
    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Villager => "VILLAGER",
            Self::Werewolf => "WEREWOLF",
            Self::Seer => "SEER",
        }
    }
}

/// A hint value the mayor answers a guess with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Yes,
    No,
    Maybe,
    SoClose,
    WayOff,
    Correct,
}

impl TokenType {
    /// Every token except `CORRECT`, i.e. the ones that keep the day going.
    pub const HINTS: [TokenType; 5] = [
        TokenType::Yes,
        TokenType::No,
        TokenType::Maybe,
        TokenType::SoClose,
        TokenType::WayOff,
    ];
}

/// Which team won a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Village,
    Werewolf,
}

/// Word corpus tier used when drawing candidate words.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

// ---------------------------------------------------------------------------
// Snapshot: the STATE_UPDATE payload
// ---------------------------------------------------------------------------

/// One roster entry as seen by a particular viewer.
///
/// `role` is `None` when it is hidden from the viewer; on the wire that is
/// an empty string, which is what the client checks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    #[serde(with = "redacted_role")]
    pub role: Option<Role>,
    pub is_mayor: bool,
    pub is_ready: bool,
    pub wants_mayor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub votes_received: usize,
    pub is_bot: bool,
    pub score: u32,
}

/// A mayor hint (or the automatic `CORRECT` on a matching guess).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAction {
    pub id: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player_id: Option<PlayerId>,
}

/// A pending guess waiting for the mayor's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessEntry {
    pub player_id: PlayerId,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// The full game state as one viewer is allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: Phase,
    pub room_code: RoomCode,
    pub players: Vec<PlayerView>,
    pub secret_word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_word_hints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_options: Option<Vec<String>>,
    pub time_remaining: u32,
    pub tokens_used: u32,
    pub token_history: Vec<TokenAction>,
    pub guesses: Vec<GuessEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    pub my_player_id: PlayerId,
    pub difficulty: Difficulty,
    pub hints_revealed: usize,
    pub num_werewolves: usize,
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListEntry {
    pub code: RoomCode,
    pub player_count: usize,
    pub max_players: usize,
    pub phase: Phase,
    pub player_names: Vec<String>,
}

/// An emoji reaction fanned out to the room. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionEvent {
    pub player_id: PlayerId,
    pub emoji: String,
}

/// `Option<Role>` as a string where `None` is `""`.
mod redacted_role {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Role;

    pub(super) fn serialize<S: Serializer>(
        role: &Option<Role>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.serialize_str(role.map_or("", Role::as_str))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Role>, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.as_str() {
            "" => Ok(None),
            "VILLAGER" => Ok(Some(Role::Villager)),
            "WEREWOLF" => Ok(Some(Role::Werewolf)),
            "SEER" => Ok(Some(Role::Seer)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["", "VILLAGER", "WEREWOLF", "SEER"],
            )),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these shapes directly, so the tests pin
    //! the exact JSON produced by the serde attributes.

    use super::*;

    fn view(role: Option<Role>) -> PlayerView {
        PlayerView {
            id: PlayerId::new("p1"),
            name: "Luna".into(),
            role,
            is_mayor: false,
            is_ready: true,
            wants_mayor: false,
            avatar_url: None,
            votes_received: 0,
            is_bot: true,
            score: 3,
        }
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_room_code_is_normalized() {
        assert_eq!(RoomCode::new("  wolf-0042 ").as_str(), "WOLF-0042");
        assert_eq!(RoomCode::new("wolf-1"), RoomCode::new("WOLF-1"));
    }

    #[test]
    fn test_phase_wire_names_match_display() {
        for phase in [
            Phase::Lobby,
            Phase::RoleReveal,
            Phase::WordSelection,
            Phase::DayPhase,
            Phase::Voting,
            Phase::WerewolfGuess,
            Phase::GameOver,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn test_token_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenType::SoClose).unwrap(),
            "\"SO_CLOSE\""
        );
        let t: TokenType = serde_json::from_str("\"WAY_OFF\"").unwrap();
        assert_eq!(t, TokenType::WayOff);
        assert!(!TokenType::HINTS.contains(&TokenType::Correct));
    }

    #[test]
    fn test_hidden_role_serializes_as_empty_string() {
        let json = serde_json::to_value(view(None)).unwrap();
        assert_eq!(json["role"], "");
        assert_eq!(json["isBot"], true);
        assert_eq!(json["votesReceived"], 0);
        assert!(json.get("avatarUrl").is_none());
    }

    #[test]
    fn test_visible_role_round_trips() {
        let original = view(Some(Role::Seer));
        let json = serde_json::to_value(&original).unwrap();
        assert_eq!(json["role"], "SEER");
        let back: PlayerView = serde_json::from_value(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let mut json = serde_json::to_value(view(None)).unwrap();
        json["role"] = "MAYOR".into();
        assert!(serde_json::from_value::<PlayerView>(json).is_err());
    }

    #[test]
    fn test_token_action_uses_type_key() {
        let token = TokenAction {
            id: "t1".into(),
            token_type: TokenType::Correct,
            timestamp: 10,
            target_player_id: Some(PlayerId::new("p2")),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["type"], "CORRECT");
        assert_eq!(json["targetPlayerId"], "p2");
    }

    #[test]
    fn test_room_list_entry_json_format() {
        let entry = RoomListEntry {
            code: RoomCode::new("WOLF-0001"),
            player_count: 2,
            max_players: 10,
            phase: Phase::Lobby,
            player_names: vec!["Ann".into(), "Bo".into()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["code"], "WOLF-0001");
        assert_eq!(json["playerCount"], 2);
        assert_eq!(json["maxPlayers"], 10);
        assert_eq!(json["phase"], "LOBBY");
        assert_eq!(json["playerNames"], serde_json::json!(["Ann", "Bo"]));
    }
}
