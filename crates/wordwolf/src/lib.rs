//! # Wordwolf
//!
//! An authoritative server for a social deduction word game in the style
//! of Werewords, played over WebSockets.
//!
//! The server owns all game state. Browser clients send `{type, payload}`
//! commands and receive their own redacted view of the room after every
//! change. Rooms run as isolated actors with their own countdowns and
//! bots.
//!
//! ## Layers
//!
//! ```text
//! wordwolf-transport  WebSocket connections, heartbeats
//! wordwolf-protocol   wire types, JSON codec
//! wordwolf-session    participant identity, outboxes
//! wordwolf-room       game rules, room actors, registry
//! wordwolf            this crate: server loop and connection handler
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordwolf::prelude::*;
//!
//! # async fn run() -> Result<(), WordwolfError> {
//! let server = WordwolfServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::WordwolfError;
pub use server::{WordwolfServer, WordwolfServerBuilder};

/// Everything needed to configure and run a server, plus the wire types
/// a Rust client would use.
pub mod prelude {
    pub use crate::{WordwolfError, WordwolfServer, WordwolfServerBuilder};
    pub use wordwolf_protocol::{
        ClientCommand, Codec, Difficulty, GameSnapshot, JsonCodec, Phase, PlayerId, Role,
        RoomCode, ServerMessage, TokenType, Winner,
    };
    pub use wordwolf_room::{DelayRange, RoomConfig, WordBank};
    pub use wordwolf_session::SessionConfig;
}
