//! The room engine for Wordwolf.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! game state, the connected players' outboxes, and the timers and bots
//! driving the game forward.
//!
//! # Key types
//!
//! - [`Game`]: the phase state machine and every game rule
//! - [`project`]: what one player is allowed to see of a [`Game`]
//! - [`RoomRegistry`]: creates rooms and finds them by code
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: player limits, phase durations, bot pacing
//! - [`WordBank`]: the words the mayor chooses from

mod config;
mod error;
mod game;
mod projection;
mod registry;
mod room;
mod timer;
mod words;

pub use config::{DelayRange, RoomConfig};
pub use error::{RoomError, RuleError};
pub use game::{BOT_NAMES, BotTurn, Game, Player, default_avatar, werewolf_count};
pub use projection::project;
pub use registry::{RoomRegistry, collect_listing};
pub use room::{LeaveOutcome, RoomAction, RoomHandle};
pub use words::WordBank;
