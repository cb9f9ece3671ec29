//! The `{type, payload}` envelopes exchanged with clients.
//!
//! Inbound frames are decoded in two steps so that a broken payload for a
//! known type can be told apart from a type the server has never heard of:
//!
//! 1. the frame is parsed into a [`RawCommand`] (`type` string + untyped
//!    payload), then
//! 2. [`ClientCommand::try_from`] picks the payload shape by `type`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
    Difficulty, GameSnapshot, PlayerId, ProtocolError, ReactionEvent,
    RoomListEntry, TokenType,
};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// `JOIN_GAME` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGamePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// `SUBMIT_GUESS` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitGuessPayload {
    pub text: String,
}

/// `CHOOSE_WORD` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseWordPayload {
    pub word: String,
}

/// `SUBMIT_TOKEN` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTokenPayload {
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player_id: Option<PlayerId>,
}

/// `VOTE` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub target_id: PlayerId,
}

/// `SEND_REACTION` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReactionPayload {
    pub emoji: String,
}

/// `SET_DIFFICULTY` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDifficultyPayload {
    pub difficulty: Difficulty,
}

/// An inbound frame before its payload has been interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommand {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Every command a client can send.
///
/// Serializes to the same `{type, payload}` shape the server decodes,
/// which is what test clients use to build frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientCommand {
    JoinGame(JoinGamePayload),
    ListRooms,
    ToggleReady,
    ToggleWantsMayor,
    StartGame,
    AddBot,
    SubmitGuess(SubmitGuessPayload),
    ChooseWord(ChooseWordPayload),
    SubmitToken(SubmitTokenPayload),
    Vote(VotePayload),
    ResetGame,
    SendReaction(SendReactionPayload),
    RevealHint,
    SetDifficulty(SetDifficultyPayload),
}

impl ClientCommand {
    /// The wire `type` of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinGame(_) => "JOIN_GAME",
            Self::ListRooms => "LIST_ROOMS",
            Self::ToggleReady => "TOGGLE_READY",
            Self::ToggleWantsMayor => "TOGGLE_WANTS_MAYOR",
            Self::StartGame => "START_GAME",
            Self::AddBot => "ADD_BOT",
            Self::SubmitGuess(_) => "SUBMIT_GUESS",
            Self::ChooseWord(_) => "CHOOSE_WORD",
            Self::SubmitToken(_) => "SUBMIT_TOKEN",
            Self::Vote(_) => "VOTE",
            Self::ResetGame => "RESET_GAME",
            Self::SendReaction(_) => "SEND_REACTION",
            Self::RevealHint => "REVEAL_HINT",
            Self::SetDifficulty(_) => "SET_DIFFICULTY",
        }
    }
}

/// Parses the payload of a known command type.
fn payload<T: DeserializeOwned>(
    kind: &'static str,
    value: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(value)
        .map_err(|source| ProtocolError::InvalidPayload { kind, source })
}

impl TryFrom<RawCommand> for ClientCommand {
    type Error = ProtocolError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let RawCommand { kind, payload: p } = raw;
        // Payload-less commands ignore whatever payload was sent.
        let cmd = match kind.as_str() {
            "JOIN_GAME" => Self::JoinGame(payload("JOIN_GAME", p)?),
            "LIST_ROOMS" => Self::ListRooms,
            "TOGGLE_READY" => Self::ToggleReady,
            "TOGGLE_WANTS_MAYOR" => Self::ToggleWantsMayor,
            "START_GAME" => Self::StartGame,
            "ADD_BOT" => Self::AddBot,
            "SUBMIT_GUESS" => Self::SubmitGuess(payload("SUBMIT_GUESS", p)?),
            "CHOOSE_WORD" => Self::ChooseWord(payload("CHOOSE_WORD", p)?),
            "SUBMIT_TOKEN" => Self::SubmitToken(payload("SUBMIT_TOKEN", p)?),
            "VOTE" => Self::Vote(payload("VOTE", p)?),
            "RESET_GAME" => Self::ResetGame,
            "SEND_REACTION" => Self::SendReaction(payload("SEND_REACTION", p)?),
            "REVEAL_HINT" => Self::RevealHint,
            "SET_DIFFICULTY" => {
                Self::SetDifficulty(payload("SET_DIFFICULTY", p)?)
            }
            _ => return Err(ProtocolError::UnknownType(kind)),
        };
        Ok(cmd)
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Every message the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// The receiving player's view of the room.
    StateUpdate(Box<GameSnapshot>),
    /// Something the receiving player sent was rejected.
    Error { message: String },
    /// Someone in the room reacted.
    Reaction(ReactionEvent),
    /// Rooms currently open for joining.
    RoomList { rooms: Vec<RoomListEntry> },
}

impl ServerMessage {
    /// Shorthand for an `ERROR` message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
