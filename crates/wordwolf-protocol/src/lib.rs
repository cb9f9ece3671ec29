//! Wire protocol for Wordwolf.
//!
//! This crate defines the "language" that browser clients and the server
//! speak:
//!
//! - **Types** ([`PlayerId`], [`Phase`], [`GameSnapshot`], etc.): the
//!   game vocabulary that appears inside messages.
//! - **Messages** ([`ClientCommand`], [`ServerMessage`]): the
//!   `{type, payload}` envelopes in each direction.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientCommand) → Room (game rules)
//! ```
//!
//! The protocol layer knows nothing about connections or rooms.

mod codec;
mod error;
mod message;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{
    ChooseWordPayload, ClientCommand, JoinGamePayload, RawCommand, SendReactionPayload,
    SetDifficultyPayload, SubmitGuessPayload, SubmitTokenPayload, ServerMessage,
    VotePayload,
};
pub use types::{
    Difficulty, GameSnapshot, GuessEntry, Phase, PlayerView, ReactionEvent,
    Role, RoomCode, RoomListEntry, TokenAction, TokenType, Winner, PlayerId,
};
